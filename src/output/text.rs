use crate::event::{DecodeError, Position};

/// One token per line
pub fn token_lines<S: AsRef<str>>(tokens: &[S]) -> String {
    let mut text = String::with_capacity(tokens.len() * 11);
    for token in tokens {
        text.push_str(token.as_ref());
        text.push('\n');
    }
    text
}

/// `x y` per position word
pub fn position_lines<S: AsRef<str>>(tokens: &[S]) -> Result<String, DecodeError> {
    let mut text = String::with_capacity(tokens.len() * 8);
    for token in tokens {
        let Position { x, y } = Position::from_token(token.as_ref())?;
        text.push_str(&format!("{} {}\n", x, y));
    }
    Ok(text)
}
