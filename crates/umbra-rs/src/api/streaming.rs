//! Line-buffered SSE frame parsing, shared by both provider clients.
//!
//! Network chunks split SSE frames at arbitrary byte boundaries, so the
//! parser buffers until a full line is available and yields only the
//! `data:` payloads. Comment lines, `event:` lines, and blank separators
//! are skipped — both providers tag their payloads inside the JSON, so
//! the `data:` body is all the clients need.

/// Incremental SSE parser. Feed raw chunks in, take complete `data:`
/// payloads out.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
}

/// One parsed SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// A `data:` payload (JSON text, unparsed).
    Data(String),
    /// The `data: [DONE]` terminator used by the chat-completions API.
    Done,
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a raw network chunk, returning every frame completed by it.
    pub fn push(&mut self, chunk: &str) -> Vec<SseFrame> {
        self.buffer.push_str(chunk);

        let mut frames = Vec::new();
        while let Some(newline_pos) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline_pos).collect();
            if let Some(frame) = Self::parse_line(line.trim()) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Flush any trailing partial line (a final frame without a newline).
    pub fn finish(&mut self) -> Option<SseFrame> {
        let line = std::mem::take(&mut self.buffer);
        Self::parse_line(line.trim())
    }

    fn parse_line(line: &str) -> Option<SseFrame> {
        if line.is_empty() || line.starts_with(':') {
            return None;
        }
        let data = line.strip_prefix("data: ").or_else(|| line.strip_prefix("data:"))?;
        if data.trim() == "[DONE]" {
            Some(SseFrame::Done)
        } else {
            Some(SseFrame::Data(data.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yields_complete_data_lines() {
        let mut parser = SseParser::new();
        let frames = parser.push("data: {\"a\":1}\n\ndata: {\"b\":2}\n");
        assert_eq!(
            frames,
            vec![
                SseFrame::Data("{\"a\":1}".into()),
                SseFrame::Data("{\"b\":2}".into()),
            ]
        );
    }

    #[test]
    fn buffers_across_chunk_boundaries() {
        let mut parser = SseParser::new();
        assert!(parser.push("data: {\"par").is_empty());
        let frames = parser.push("tial\":true}\n");
        assert_eq!(frames, vec![SseFrame::Data("{\"partial\":true}".into())]);
    }

    #[test]
    fn recognizes_done_terminator() {
        let mut parser = SseParser::new();
        let frames = parser.push("data: [DONE]\n");
        assert_eq!(frames, vec![SseFrame::Done]);
    }

    #[test]
    fn skips_events_comments_and_blanks() {
        let mut parser = SseParser::new();
        let frames = parser.push(": keepalive\nevent: message_start\n\ndata: {}\n");
        assert_eq!(frames, vec![SseFrame::Data("{}".into())]);
    }

    #[test]
    fn finish_flushes_trailing_partial_line() {
        let mut parser = SseParser::new();
        assert!(parser.push("data: {\"tail\":1}").is_empty());
        assert_eq!(parser.finish(), Some(SseFrame::Data("{\"tail\":1}".into())));
        assert_eq!(parser.finish(), None);
    }
}
