//! Server-sent events line buffering

/// Sentinel payload that closes an OpenAI-compatible stream
pub(crate) const DONE: &str = "[DONE]";

/// Splits a byte stream into SSE `data:` payloads
///
/// Network chunks do not respect line boundaries, so incomplete lines are
/// held back until the rest arrives.
#[derive(Debug, Default)]
pub(crate) struct SseBuffer {
    pending: Vec<u8>,
}

impl SseBuffer {
    /// Feed a chunk and return every complete `data:` payload it finished
    pub(crate) fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            if let Some(data) = parse_line(&line) {
                payloads.push(data);
            }
        }
        payloads
    }

    /// Flush whatever is left once the stream has ended
    pub(crate) fn finish(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.pending);
        parse_line(&line)
    }
}

fn parse_line(line: &[u8]) -> Option<String> {
    let line = String::from_utf8_lossy(line);
    let data = line.trim().strip_prefix("data:")?.trim();
    if data.is_empty() {
        None
    } else {
        Some(data.to_string())
    }
}
