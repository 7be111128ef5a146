//! Minimal PDF 1.4 writer: one Helvetica font, positioned text only. Output carries no
//! creation date or document ID, so equal layouts serialize to equal bytes.

use crate::report::layout::Page;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const FONT_SIZE: u64 = 12;

fn mm_to_pt(mm: f32) -> f32 {
    mm * 72.0 / 25.4
}

pub fn render(pages: &[Page]) -> Vec<u8> {
    let page_count = pages.len();
    // 1 catalog, 2 page tree, 3 font, then a (page, contents) pair per page.
    let object_count = 3 + page_count * 2;
    let mut out: Vec<u8> = Vec::new();
    let mut offsets = Vec::with_capacity(object_count);

    out.extend_from_slice(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n");

    let kids = (0..page_count)
        .map(|i| format!("{} 0 R", page_object_id(i)))
        .collect::<Vec<_>>()
        .join(" ");

    push_object(&mut out, &mut offsets, 1, b"<< /Type /Catalog /Pages 2 0 R >>");
    push_object(
        &mut out,
        &mut offsets,
        2,
        format!("<< /Type /Pages /Kids [{kids}] /Count {page_count} >>").as_bytes(),
    );
    push_object(
        &mut out,
        &mut offsets,
        3,
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    );

    let media_box = format!(
        "[0 0 {:.2} {:.2}]",
        mm_to_pt(PAGE_WIDTH_MM),
        mm_to_pt(PAGE_HEIGHT_MM)
    );
    for (i, page) in pages.iter().enumerate() {
        let page_id = page_object_id(i);
        let contents_id = page_id + 1;
        push_object(
            &mut out,
            &mut offsets,
            page_id,
            format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox {media_box} \
                 /Resources << /Font << /F1 3 0 R >> >> /Contents {contents_id} 0 R >>"
            )
            .as_bytes(),
        );

        let stream = content_stream(page);
        let mut body = format!("<< /Length {} >>\nstream\n", stream.len()).into_bytes();
        body.extend_from_slice(&stream);
        body.extend_from_slice(b"\nendstream");
        push_object(&mut out, &mut offsets, contents_id, &body);
    }

    let xref_offset = out.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", object_count + 1);
    for offset in &offsets {
        xref.push_str(&format!("{offset:010} 00000 n \n"));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        object_count + 1
    ));
    out.extend_from_slice(xref.as_bytes());
    out
}

fn page_object_id(page_index: usize) -> usize {
    4 + page_index * 2
}

// Objects are written in id order, so `offsets[id - 1]` is the object's offset.
fn push_object(out: &mut Vec<u8>, offsets: &mut Vec<usize>, id: usize, body: &[u8]) {
    debug_assert_eq!(offsets.len() + 1, id);
    offsets.push(out.len());
    out.extend_from_slice(format!("{id} 0 obj\n").as_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(b"\nendobj\n");
}

fn content_stream(page: &Page) -> Vec<u8> {
    let mut stream = format!("BT\n/F1 {FONT_SIZE} Tf\n").into_bytes();
    for line in &page.lines {
        let x = mm_to_pt(line.x as f32);
        let y = mm_to_pt(PAGE_HEIGHT_MM - line.y as f32);
        stream.extend_from_slice(format!("1 0 0 1 {x:.2} {y:.2} Tm\n(").as_bytes());
        stream.extend_from_slice(&encode_text(&line.text));
        stream.extend_from_slice(b") Tj\n");
    }
    stream.extend_from_slice(b"ET");
    stream
}

// Helvetica advance widths for ' '..='~', in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];
const DEFAULT_WIDTH: u16 = 556;

/// Whether `text` set in the report font fits in `max_mm` millimetres.
pub(crate) fn fits_width(text: &str, max_mm: u32) -> bool {
    let units: u64 = text
        .chars()
        .map(|ch| {
            u64::from(match ch {
                ' '..='~' => HELVETICA_WIDTHS[ch as usize - 0x20],
                _ => DEFAULT_WIDTH,
            })
        })
        .sum();
    // units/1000 em at FONT_SIZE pt, 72 pt per 25.4 mm.
    units * FONT_SIZE * 254 <= max_mm as u64 * 720_000
}

/// Encodes text as an escaped WinAnsi string body; unmappable characters become `?`.
pub(crate) fn encode_text(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let byte = match ch {
            '(' | ')' | '\\' => {
                bytes.push(b'\\');
                ch as u8
            }
            '\u{20}'..='\u{7e}' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        };
        bytes.push(byte);
    }
    bytes
}
