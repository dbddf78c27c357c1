//! Server-sent event lines from streamed chat completions.

use kahani_error::{ModelsError, ModelsErrorKind, ModelsResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// What one SSE line contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StreamLine {
    Content(String),
    Done,
    Skip,
}

pub(crate) fn parse_stream_line(line: &str) -> ModelsResult<StreamLine> {
    let line = line.trim();
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(StreamLine::Skip);
    };
    let data = data.trim();
    if data == "[DONE]" {
        return Ok(StreamLine::Done);
    }
    let chunk: StreamChunk = serde_json::from_str(data).map_err(|e| {
        ModelsError::new(ModelsErrorKind::ResponseParsing(format!(
            "Malformed stream chunk: {}",
            e
        )))
    })?;
    let delta: String = chunk
        .choices
        .into_iter()
        .filter_map(|c| c.delta.content)
        .collect();
    if delta.is_empty() {
        Ok(StreamLine::Skip)
    } else {
        Ok(StreamLine::Content(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_delta() {
        let line = r#"data: {"choices":[{"index":0,"delta":{"content":"Once"}}]}"#;
        assert_eq!(
            parse_stream_line(line).unwrap(),
            StreamLine::Content("Once".into())
        );
    }

    #[test]
    fn test_done_and_comments() {
        assert_eq!(parse_stream_line("data: [DONE]\n").unwrap(), StreamLine::Done);
        assert_eq!(parse_stream_line(": keep-alive").unwrap(), StreamLine::Skip);
        assert_eq!(parse_stream_line("").unwrap(), StreamLine::Skip);
    }

    #[test]
    fn test_role_only_delta_is_skipped() {
        let line = r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#;
        assert_eq!(parse_stream_line(line).unwrap(), StreamLine::Skip);
    }

    #[test]
    fn test_garbage_is_parse_error() {
        assert!(parse_stream_line("data: {not json").is_err());
    }
}
