/// Edit applied to a field's buffer, decoded from one keystroke.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EditCommand {
    Insert(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

impl EditCommand {
    /// Maps a gpui key name (plus the typed character, if any) to an edit.
    ///
    /// `enter` only inserts a newline in multiline fields; elsewhere it is left to the
    /// form, which treats it as submit.
    pub fn from_key(key: &str, key_char: Option<&str>, multiline: bool) -> Option<Self> {
        match key {
            "backspace" => Some(Self::Backspace),
            "delete" => Some(Self::Delete),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "home" | "up" if !multiline || key == "home" => Some(Self::Home),
            "end" | "down" if !multiline || key == "end" => Some(Self::End),
            "enter" if multiline => Some(Self::Insert("\n".to_string())),
            "enter" | "escape" | "tab" => None,
            _ => key_char
                .filter(|text| !text.is_empty() && !text.chars().any(char::is_control))
                .map(|text| Self::Insert(text.to_string())),
        }
    }
}

/// Caret-tracking buffer behind one rendered input. Positions count chars, not bytes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EditBuffer {
    value: String,
    caret: usize,
}

impl EditBuffer {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        let caret = value.chars().count();
        Self { value, caret }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn len(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Replaces the content when it differs, keeping the caret in range.
    pub fn sync(&mut self, value: &str) {
        if self.value != value {
            self.value = value.to_string();
            self.caret = self.len();
        }
    }

    /// Applies `command`; returns whether the value changed. Inserts past `max_length`
    /// are truncated the way a `maxlength` attribute truncates typing and pasting.
    pub fn apply(&mut self, command: &EditCommand, max_length: Option<usize>) -> bool {
        match command {
            EditCommand::Insert(text) => self.insert(text, max_length),
            EditCommand::Backspace => {
                if self.caret == 0 {
                    return false;
                }
                self.replace(self.caret - 1, self.caret, "");
                true
            }
            EditCommand::Delete => {
                if self.caret >= self.len() {
                    return false;
                }
                self.replace(self.caret, self.caret + 1, "");
                true
            }
            EditCommand::Left => {
                self.caret = self.caret.saturating_sub(1);
                false
            }
            EditCommand::Right => {
                self.caret = (self.caret + 1).min(self.len());
                false
            }
            EditCommand::Home => {
                self.caret = 0;
                false
            }
            EditCommand::End => {
                self.caret = self.len();
                false
            }
        }
    }

    fn insert(&mut self, text: &str, max_length: Option<usize>) -> bool {
        let room = max_length.map_or(usize::MAX, |max| max.saturating_sub(self.len()));
        let text = text.chars().take(room).collect::<String>();
        if text.is_empty() {
            return false;
        }
        self.replace(self.caret, self.caret, &text);
        true
    }

    fn replace(&mut self, start: usize, end: usize, insert: &str) {
        let byte_start = byte_index_at_char(&self.value, start);
        let byte_end = byte_index_at_char(&self.value, end);
        self.value.replace_range(byte_start..byte_end, insert);
        self.caret = start + insert.chars().count();
    }

    /// Text before and after the caret, for drawing the caret between them.
    pub fn split_at_caret(&self) -> (&str, &str) {
        self.value
            .split_at(byte_index_at_char(&self.value, self.caret))
    }
}

fn byte_index_at_char(value: &str, char_index: usize) -> usize {
    value
        .char_indices()
        .nth(char_index)
        .map_or(value.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::{EditBuffer, EditCommand};

    #[test]
    fn inserts_and_deletes_around_caret() {
        let mut buffer = EditBuffer::new("héllo");
        buffer.apply(&EditCommand::Left, None);
        buffer.apply(&EditCommand::Left, None);
        assert!(buffer.apply(&EditCommand::Insert("X".into()), None));
        assert_eq!(buffer.value(), "hélXlo");
        assert!(buffer.apply(&EditCommand::Backspace, None));
        assert!(buffer.apply(&EditCommand::Delete, None));
        assert_eq!(buffer.value(), "hélo");
        assert_eq!(buffer.split_at_caret(), ("hél", "o"));
    }

    #[test]
    fn insert_respects_max_length() {
        let mut buffer = EditBuffer::new("abc");
        assert!(buffer.apply(&EditCommand::Insert("defg".into()), Some(5)));
        assert_eq!(buffer.value(), "abcde");
        assert!(!buffer.apply(&EditCommand::Insert("z".into()), Some(5)));
    }

    #[test]
    fn keys_map_to_commands() {
        assert_eq!(
            EditCommand::from_key("a", Some("a"), false),
            Some(EditCommand::Insert("a".into()))
        );
        assert_eq!(EditCommand::from_key("enter", None, false), None);
        assert_eq!(
            EditCommand::from_key("enter", None, true),
            Some(EditCommand::Insert("\n".into()))
        );
        assert_eq!(EditCommand::from_key("tab", Some("\t"), true), None);
        assert_eq!(EditCommand::from_key("up", None, true), None);
        assert_eq!(EditCommand::from_key("up", None, false), Some(EditCommand::Home));
    }

    #[test]
    fn sync_moves_caret_to_end_only_on_change() {
        let mut buffer = EditBuffer::new("@calm");
        buffer.apply(&EditCommand::Home, None);
        buffer.sync("@calm");
        assert_eq!(buffer.caret(), 0);
        buffer.sync("calm");
        assert_eq!(buffer.caret(), 4);
    }
}
