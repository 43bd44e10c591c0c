//! Scoped handling of the reset credential.
//!
//! The secret only ever lives in two places: the [`CredentialInput`] buffer
//! while the operator types it, and the [`Credential`] handed to the reset
//! request. Both overwrite their bytes when they are cleared or dropped, and
//! neither can be printed.

use std::fmt;

/// Initial buffer size, so typical passwords never reallocate mid-entry.
const INPUT_CAPACITY: usize = 128;

/// Overwrite and release a string's contents.
fn wipe(secret: &mut String) {
    let mut bytes = std::mem::take(secret).into_bytes();
    bytes.fill(0);
    std::hint::black_box(&bytes);
}

/// A submitted credential, consumed by exactly one reset request.
pub struct Credential(String);

impl Credential {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Borrow the secret for the request body.
    pub fn expose(&self) -> &str {
        &self.0
    }

}

impl Drop for Credential {
    fn drop(&mut self) {
        wipe(&mut self.0);
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Keystroke buffer behind the recovery prompt.
pub struct CredentialInput {
    buffer: String,
}

impl Default for CredentialInput {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialInput {
    pub fn new() -> Self {
        Self {
            buffer: String::with_capacity(INPUT_CAPACITY),
        }
    }

    pub fn push(&mut self, c: char) {
        if self.buffer.len() + c.len_utf8() > self.buffer.capacity() {
            // Grow by hand so the old allocation is wiped, not just freed
            let mut grown = String::with_capacity((self.buffer.capacity() * 2).max(INPUT_CAPACITY));
            grown.push_str(&self.buffer);
            wipe(&mut self.buffer);
            self.buffer = grown;
        }
        self.buffer.push(c);
    }

    pub fn pop(&mut self) {
        self.buffer.pop();
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// True when there is nothing worth submitting (empty or whitespace only).
    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// One `*` per typed character.
    pub fn masked(&self) -> String {
        "*".repeat(self.buffer.chars().count())
    }

    /// Move the typed secret out, leaving the buffer empty.
    ///
    /// Returns `None` and keeps the buffer untouched if it is blank.
    pub fn take(&mut self) -> Option<Credential> {
        if self.is_blank() {
            return None;
        }
        Some(Credential(std::mem::replace(
            &mut self.buffer,
            String::with_capacity(INPUT_CAPACITY),
        )))
    }

    /// Discard whatever has been typed.
    pub fn wipe(&mut self) {
        wipe(&mut self.buffer);
        self.buffer.reserve(INPUT_CAPACITY);
    }
}

impl Drop for CredentialInput {
    fn drop(&mut self) {
        wipe(&mut self.buffer);
    }
}

impl fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialInput").field("len", &self.buffer.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(s: &str) -> CredentialInput {
        let mut input = CredentialInput::new();
        s.chars().for_each(|c| input.push(c));
        input
    }

    #[test]
    fn test_take_empties_input() {
        let mut input = typed("hunter2");
        let credential = input.take().unwrap();
        assert_eq!(credential.expose(), "hunter2");
        assert!(input.is_empty());
    }

    #[test]
    fn test_blank_input_not_taken() {
        let mut input = typed("   ");
        assert!(input.take().is_none());
        assert!(!input.is_empty());

        let mut empty = CredentialInput::new();
        assert!(empty.take().is_none());
    }

    #[test]
    fn test_wipe() {
        let mut input = typed("secret");
        input.wipe();
        assert!(input.is_empty());
        assert_eq!(input.masked(), "");
    }

    #[test]
    fn test_masked_counts_chars() {
        let mut input = typed("pä$");
        assert_eq!(input.masked(), "***");
        input.pop();
        assert_eq!(input.masked(), "**");
    }

    #[test]
    fn test_debug_never_reveals_secret() {
        let credential = Credential::new("topsecret");
        assert!(!format!("{:?}", credential).contains("topsecret"));

        let input = typed("topsecret");
        assert!(!format!("{:?}", input).contains("topsecret"));
    }

    #[test]
    fn test_long_input_survives_growth() {
        let long: String = "abcdefgh".repeat(INPUT_CAPACITY / 4);
        let mut input = typed(&long);
        assert!(input.buffer.capacity() >= long.len());
        assert_eq!(input.masked().len(), long.len());
        assert_eq!(input.take().unwrap().expose(), long);
    }

    #[test]
    fn test_wipe_helper_clears() {
        let mut s = String::from("abc");
        wipe(&mut s);
        assert!(s.is_empty());
    }
}
