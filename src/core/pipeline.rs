// src/core/pipeline.rs

use crate::models::{ParseError, Pipeline, Stage, StageInput, StageOutput, Word};

/// Builds a [`Pipeline`] from a token sequence.
///
/// Tokens are split on bare `|` words (a quoted `'|'` is an argument); each segment becomes a stage whose first token is the name
/// and the rest its arguments. One anonymous pipe is then allocated per adjacent pair:
/// the write end becomes the upstream stage's stdout and the read end the downstream
/// stage's stdin. Every other handle stays bound to the terminal.
///
/// Redirections are not looked at here; see [`crate::core::redirect::resolve`].
pub fn assemble(tokens: Vec<Word>) -> Result<Pipeline, ParseError> {
    let mut stages = Vec::new();
    let mut segment: Vec<Word> = Vec::new();

    for token in tokens {
        if token.is_pipe() {
            stages.push(stage_from_segment(std::mem::take(&mut segment))?);
        } else {
            segment.push(token);
        }
    }
    stages.push(stage_from_segment(segment)?);

    connect(&mut stages)?;
    log::debug!("Assembled pipeline with {} stage(s).", stages.len());
    Ok(Pipeline { stages })
}

fn stage_from_segment(segment: Vec<Word>) -> Result<Stage, ParseError> {
    let mut words = segment.into_iter();
    let name = words.next().ok_or(ParseError::EmptyPipelineSegment)?;
    Ok(Stage::new(name.into_string(), words.collect()))
}

/// Wires each stage's stdout to the next stage's stdin.
fn connect(stages: &mut [Stage]) -> Result<(), ParseError> {
    for upstream in 0..stages.len().saturating_sub(1) {
        let (reader, writer) = os_pipe::pipe().map_err(ParseError::PipeCreationFailed)?;
        if let Some(stage) = stages.get_mut(upstream) {
            stage.stdout = StageOutput::Pipe(writer);
        }
        if let Some(stage) = stages.get_mut(upstream + 1) {
            stage.stdin = StageInput::Pipe(reader);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};

    fn tokens(words: &[&str]) -> Vec<Word> {
        words.iter().map(|w| Word::bare(*w)).collect()
    }

    #[test]
    fn test_single_stage_is_bound_to_terminal() {
        let pipeline = assemble(tokens(&["echo", "hi", "there"])).unwrap();
        assert_eq!(pipeline.len(), 1);
        let stage = &pipeline.stages[0];
        assert_eq!(stage.name, "echo");
        assert_eq!(stage.args, vec!["hi", "there"]);
        assert!(matches!(stage.stdin, StageInput::Terminal));
        assert!(stage.stdout.is_terminal());
        assert!(stage.stderr.is_terminal());
    }

    #[test]
    fn test_three_stages_share_pipes() {
        let mut pipeline = assemble(tokens(&["cmd1", "|", "cmd2", "-x", "|", "cmd3"])).unwrap();
        assert_eq!(pipeline.len(), 3);
        let names: Vec<_> = pipeline.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["cmd1", "cmd2", "cmd3"]);

        assert!(matches!(pipeline.stages[0].stdin, StageInput::Terminal));
        assert!(pipeline.stages[2].stdout.is_terminal());

        // Bytes written to stage i's stdout come out of stage i+1's stdin.
        for (i, payload) in [(0usize, b"first".as_slice()), (1, b"second".as_slice())] {
            let StageOutput::Pipe(mut writer) = std::mem::take(&mut pipeline.stages[i].stdout)
            else {
                panic!("stage {i} stdout is not a pipe");
            };
            let StageInput::Pipe(mut reader) = std::mem::take(&mut pipeline.stages[i + 1].stdin)
            else {
                panic!("stage {} stdin is not a pipe", i + 1);
            };
            writer.write_all(payload).unwrap();
            drop(writer);
            let mut received = Vec::new();
            reader.read_to_end(&mut received).unwrap();
            assert_eq!(received, payload);
        }
    }

    #[test]
    fn test_quoted_pipe_is_an_argument() {
        let pipeline = assemble(vec![Word::bare("echo"), Word::quoted("|")]).unwrap();
        assert_eq!(pipeline.len(), 1);
        assert_eq!(pipeline.stages[0].args, vec!["|"]);
        assert!(pipeline.stages[0].stdout.is_terminal());
    }

    #[test]
    fn test_empty_segments_are_rejected() {
        for words in [
            vec!["|", "wc"],
            vec!["ls", "|"],
            vec!["ls", "|", "|", "wc"],
            vec![],
        ] {
            let result = assemble(tokens(&words));
            assert!(
                matches!(result, Err(ParseError::EmptyPipelineSegment)),
                "{words:?}"
            );
        }
    }
}
