use std::fmt::Debug;

/// A unit of text: the character width a printer produces.
///
/// Formatting is always done on UTF-8 `str` data. The unit only decides the
/// shape of the text returned by `Printer::format` and held by `TextBuffer`,
/// so conversion happens once, at the edge.
///
/// Implemented for `u8` (UTF-8, `String`), `u16` (UTF-16, `Vec<u16>`) and
/// `char` (UTF-32, `Vec<char>`).
pub trait TextUnit:
    Copy + Debug + Default + Eq + Send + Sync + 'static
{
    /// The owned text type for this width.
    type Text: Clone + Debug + Default + Eq + Send + Sync;

    /// Appends `s`, converted to this width, to `text`.
    fn push_str(text: &mut Self::Text, s: &str);

    /// Returns the number of units in `text`.
    fn len(text: &Self::Text) -> usize;
}

impl TextUnit for u8 {
    type Text = String;

    #[inline]
    fn push_str(text: &mut String, s: &str) {
        text.push_str(s);
    }

    #[inline]
    fn len(text: &String) -> usize {
        text.len()
    }
}

impl TextUnit for u16 {
    type Text = Vec<u16>;

    #[inline]
    fn push_str(text: &mut Vec<u16>, s: &str) {
        text.extend(s.encode_utf16());
    }

    #[inline]
    fn len(text: &Vec<u16>) -> usize {
        text.len()
    }
}

impl TextUnit for char {
    type Text = Vec<char>;

    #[inline]
    fn push_str(text: &mut Vec<char>, s: &str) {
        text.extend(s.chars());
    }

    #[inline]
    fn len(text: &Vec<char>) -> usize {
        text.len()
    }
}

/// The platform's wide character: UTF-16 on Windows, UTF-32 elsewhere.
#[cfg(windows)]
pub type WChar = u16;

/// The platform's wide character: UTF-16 on Windows, UTF-32 elsewhere.
#[cfg(not(windows))]
pub type WChar = char;

/// Converts `s` into text of the given width.
pub fn convert<U: TextUnit>(s: &str) -> U::Text {
    let mut text = U::Text::default();
    U::push_str(&mut text, s);
    text
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn converts_to_every_width() {
        assert_eq!(convert::<u8>("héllo"), "héllo");
        assert_eq!(
            convert::<u16>("h€"),
            vec![u16::from(b'h'), 0x20AC]
        );
        assert_eq!(convert::<char>("h€"), vec!['h', '€']);
    }

    #[test]
    fn astral_characters_take_two_utf16_units() {
        let text = convert::<u16>("🦀");
        assert_eq!(<u16 as TextUnit>::len(&text), 2);
        assert_eq!(<char as TextUnit>::len(&convert::<char>("🦀")), 1);
    }
}
