use encoding_rs::Encoding;
use oem_cp::code_table::DECODING_TABLE_CP852;
use oem_cp::decode_string_complete_table;
use std::io::BufRead;
use tracing::warn;

use crate::error::ParseError;

/// Кодовая страница входного файла.
///
/// Польские банки отдают MT940 в DOS-кодировке 852, остальные однобайтовые
/// кодировки берутся из `encoding_rs` по метке WHATWG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePage {
    /// IBM/DOS 852 (центральноевропейская)
    Cp852,
    /// любая кодировка WHATWG: windows-1250, iso-8859-2, utf-8, ...
    Whatwg(&'static Encoding),
}

impl CodePage {
    pub fn from_label(label: &str) -> Result<Self, ParseError> {
        let norm = label.trim().to_ascii_lowercase();
        match norm.as_str() {
            "cp852" | "ibm852" | "852" | "dos-852" => Ok(CodePage::Cp852),
            _ => Encoding::for_label(norm.as_bytes())
                .map(CodePage::Whatwg)
                .ok_or_else(|| ParseError::UnknownCodePage(label.to_string())),
        }
    }

    /// Декодирует одну строку.
    ///
    /// Ошибки декодирования не фатальны: строка логируется и проходит дальше как есть
    /// (невалидные байты заменяются на U+FFFD).
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            CodePage::Cp852 => decode_string_complete_table(bytes, &DECODING_TABLE_CP852),
            CodePage::Whatwg(encoding) => {
                match encoding.decode_without_bom_handling_and_without_replacement(bytes) {
                    Some(text) => text.into_owned(),
                    None => {
                        let passthrough = String::from_utf8_lossy(bytes).into_owned();
                        warn!(
                            encoding = encoding.name(),
                            line = %passthrough,
                            "line is not valid in the configured code page, passing it through"
                        );
                        passthrough
                    }
                }
            }
        }
    }
}

/// Ленивый одноразовый итератор по строкам файла.
///
/// Режет поток по `\n`, убирает `\r` в конце, декодирует строку из кодовой страницы,
/// выбрасывает NUL и обрезает пробелы по краям. Последняя строка без `\n` тоже выдаётся.
/// После ошибки чтения итератор заканчивается.
#[derive(Debug)]
pub struct LineScanner<R> {
    reader: R,
    code_page: CodePage,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> LineScanner<R> {
    pub fn new(reader: R, code_page: CodePage) -> Self {
        Self {
            reader,
            code_page,
            buf: Vec::new(),
            done: false,
        }
    }

    fn clean(&self, bytes: &[u8]) -> String {
        let text = self.code_page.decode(bytes);
        // NUL - разделитель полей дайджеста, в данных его быть не должно
        let text = if text.contains('\0') {
            text.replace('\0', "")
        } else {
            text
        };
        text.trim().to_string()
    }
}

impl<R: BufRead> Iterator for LineScanner<R> {
    type Item = Result<String, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(_) => {
                let mut bytes = self.buf.as_slice();
                match bytes.strip_suffix(b"\n") {
                    Some(stripped) => bytes = stripped,
                    // строка без перевода строки бывает только последней
                    None => self.done = true,
                }
                if let Some(stripped) = bytes.strip_suffix(b"\r") {
                    bytes = stripped;
                }
                Some(Ok(self.clean(bytes)))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, BufReader, Read};

    fn scan(input: &[u8], code_page: CodePage) -> Vec<String> {
        LineScanner::new(input, code_page)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn splits_lines_and_strips_cr() {
        let lines = scan(b":20:MT940\r\n:25:/PL123\r\n", CodePage::Cp852);
        assert_eq!(lines, vec![":20:MT940", ":25:/PL123"]);
    }

    #[test]
    fn emits_last_line_without_newline() {
        let lines = scan(b"first\nlast", CodePage::Cp852);
        assert_eq!(lines, vec!["first", "last"]);
    }

    #[test]
    fn keeps_empty_lines_in_the_middle() {
        let lines = scan(b"a\n\n  \nb\n", CodePage::Cp852);
        assert_eq!(lines, vec!["a", "", "", "b"]);
    }

    #[test]
    fn trims_whitespace() {
        let lines = scan(b"   :86:020  \t\n", CodePage::Cp852);
        assert_eq!(lines, vec![":86:020"]);
    }

    #[test]
    fn decodes_cp852() {
        // 0x88 = ł, 0xA2 = ó
        let lines = scan(b"Zap\x88ata za \xA2w\n", CodePage::Cp852);
        assert_eq!(lines, vec!["Zapłata za ów"]);
    }

    #[test]
    fn decodes_whatwg_label() {
        // windows-1250: 0xB3 = ł
        let cp = CodePage::from_label("windows-1250").unwrap();
        let lines = scan(b"Zap\xB3ata\n", cp);
        assert_eq!(lines, vec!["Zapłata"]);
    }

    #[test]
    fn invalid_bytes_are_passed_through() {
        let cp = CodePage::from_label("utf-8").unwrap();
        let lines = scan(b"ab\xFFcd\n", cp);
        assert_eq!(lines, vec!["ab\u{FFFD}cd"]);
    }

    #[test]
    fn removes_nul_bytes() {
        let lines = scan(b"a\x00b\n", CodePage::Cp852);
        assert_eq!(lines, vec!["ab"]);
    }

    #[test]
    fn from_label_accepts_aliases_and_rejects_unknown() {
        assert_eq!(CodePage::from_label("CP852").unwrap(), CodePage::Cp852);
        assert_eq!(CodePage::from_label(" ibm852 ").unwrap(), CodePage::Cp852);
        assert!(matches!(
            CodePage::from_label("no-such-page"),
            Err(ParseError::UnknownCodePage(_))
        ));
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_error_is_yielded_once_then_stops() {
        let mut scanner = LineScanner::new(BufReader::new(FailingReader), CodePage::Cp852);
        assert!(matches!(scanner.next(), Some(Err(ParseError::Io(_)))));
        assert!(scanner.next().is_none());
    }
}
