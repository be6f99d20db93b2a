use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoryError {
    #[error("Please upload an image first.")]
    MissingImage,

    #[error("No file selected")]
    NoFile,

    #[error("Panel generation error: {0}")]
    PanelGeneration(String),

    #[error("No image data found in API response.")]
    NoImageData,

    #[error("Text generation error: {0}")]
    TextGeneration(String),

    #[error("Cannot {0} right now")]
    Busy(&'static str),

    #[error("Panel '{0}' has no generated image")]
    PanelNotReady(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Image decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoryError>;

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;

    #[test]
    fn lower_level_errors_convert_with_question_mark() {
        fn decode() -> Result<Vec<u8>> {
            Ok(base64::engine::general_purpose::STANDARD.decode("not base64!")?)
        }
        fn read() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here")?)
        }

        assert!(matches!(decode(), Err(StoryError::Decode(_))));
        assert!(matches!(read(), Err(StoryError::Io(_))));
    }

    #[test]
    fn user_facing_messages_are_fixed() {
        assert_eq!(StoryError::MissingImage.to_string(), "Please upload an image first.");
        assert_eq!(
            StoryError::NoImageData.to_string(),
            "No image data found in API response."
        );
    }
}
