/// Reassembles newline-delimited records from arbitrarily split byte chunks.
///
/// - Lines are split on `\n`; a trailing `\r` is dropped
/// - Blank lines are never yielded
/// - Invalid UTF-8 is replaced rather than rejected; the JSON parse downstream
///   decides whether the line is usable
#[derive(Debug, Default)]
pub struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk and returns every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut out = Vec::new();

        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(text) = decode(&line[..line.len() - 1]) {
                out.push(text);
            }
        }
        out
    }

    /// Returns the unterminated remainder, if any, once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        decode(&rest)
    }
}

fn decode(mut line: &[u8]) -> Option<String> {
    if let [head @ .., b'\r'] = line {
        line = head;
    }
    let text = String::from_utf8_lossy(line);
    if text.trim().is_empty() {
        None
    } else {
        Some(text.into_owned())
    }
}
