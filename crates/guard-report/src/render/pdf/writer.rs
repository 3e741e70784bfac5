use super::fonts::encode_win_ansi;
use crate::render::RenderError;
use std::io::Write;

/// Serializes numbered PDF objects and produces the cross-reference table.
pub(crate) struct PdfWriter {
    buffer: Vec<u8>,
    offsets: Vec<Option<usize>>,
}

impl PdfWriter {
    pub(crate) fn new(object_count: usize) -> Result<Self, RenderError> {
        let mut buffer = Vec::with_capacity(16 * 1024);
        buffer.write_all(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n")?;
        Ok(Self {
            buffer,
            offsets: vec![None; object_count],
        })
    }

    pub(crate) fn object(&mut self, id: usize, body: &[u8]) -> Result<(), RenderError> {
        self.mark(id)?;
        writeln!(self.buffer, "{id} 0 obj")?;
        self.buffer.write_all(body)?;
        self.buffer.write_all(b"\nendobj\n")?;
        Ok(())
    }

    pub(crate) fn stream(&mut self, id: usize, data: &[u8]) -> Result<(), RenderError> {
        self.mark(id)?;
        write!(self.buffer, "{id} 0 obj\n<< /Length {} >>\nstream\n", data.len())?;
        self.buffer.write_all(data)?;
        self.buffer.write_all(b"\nendstream\nendobj\n")?;
        Ok(())
    }

    pub(crate) fn finish(mut self, root: usize, info: usize) -> Result<Vec<u8>, RenderError> {
        let xref_offset = self.buffer.len();
        let size = self.offsets.len() + 1;

        write!(self.buffer, "xref\n0 {size}\n0000000000 65535 f \n")?;
        for (index, offset) in self.offsets.iter().copied().enumerate() {
            let offset = offset.ok_or_else(|| {
                RenderError::Layout(format!("object {} was never written", index + 1))
            })?;
            write!(self.buffer, "{offset:010} 00000 n \n")?;
        }
        write!(
            self.buffer,
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n"
        )?;

        Ok(self.buffer)
    }

    fn mark(&mut self, id: usize) -> Result<(), RenderError> {
        let offset = self.buffer.len();
        let slot = self
            .offsets
            .get_mut(id.wrapping_sub(1))
            .ok_or_else(|| RenderError::Layout(format!("object {id} out of range")))?;
        if slot.is_some() {
            return Err(RenderError::Layout(format!("object {id} written twice")));
        }
        *slot = Some(offset);
        Ok(())
    }
}

/// Encodes text as a PDF literal string in WinAnsiEncoding, escaping delimiters.
/// Characters without a WinAnsi slot are refused rather than substituted.
pub(crate) fn literal_string(text: &str) -> Result<Vec<u8>, RenderError> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for c in text.chars() {
        let byte = encode_win_ansi(c).ok_or_else(|| RenderError::Unencodable {
            field: "text".to_string(),
            character: c,
        })?;
        if matches!(byte, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(byte);
    }
    out.push(b')');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_strings_escape_delimiters() {
        assert_eq!(
            literal_string("a (b) \\ c").expect("encodes"),
            b"(a \\(b\\) \\\\ c)".to_vec()
        );
        assert_eq!(literal_string("Sí").expect("encodes"), b"(S\xed)".to_vec());
    }

    #[test]
    fn literal_strings_refuse_characters_outside_win_ansi() {
        match literal_string("Wąs") {
            Err(RenderError::Unencodable { character, .. }) => assert_eq!(character, 'ą'),
            other => panic!("expected unencodable text, got {other:?}"),
        }
    }

    #[test]
    fn finish_rejects_unwritten_objects() {
        let mut writer = PdfWriter::new(2).expect("writer");
        writer.object(1, b"<< >>").expect("object");
        assert!(matches!(writer.finish(1, 1), Err(RenderError::Layout(_))));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut writer = PdfWriter::new(1).expect("writer");
        writer.object(1, b"<< >>").expect("object");
        assert!(writer.object(1, b"<< >>").is_err());
        assert!(writer.object(3, b"<< >>").is_err());
    }
}
