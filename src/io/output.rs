use crate::probe::ProbeRecord;
use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter, Serializer};
use std::io::{self, Write};

const JSON_INDENT: &[u8] = b"    ";

pub trait OutputWriter {
    fn write_records(&mut self, records: &[ProbeRecord]) -> anyhow::Result<()>;
}

/// Writes records as a JSON array in `type_info.json` layout, byte for byte
/// what `json.dump(records, f, indent=4, sort_keys=True)` produces.
pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_records(&mut self, records: &[ProbeRecord]) -> anyhow::Result<()> {
        let formatter = AsciiFormatter::new(PrettyFormatter::with_indent(JSON_INDENT));
        let mut serializer = Serializer::with_formatter(&mut self.writer, formatter);
        records.serialize(&mut serializer)?;
        self.writer.flush()?;
        Ok(())
    }
}

/// Pretty printing with every character outside printable ASCII written as
/// a `\uXXXX` escape (UTF-16 code units, so astral characters become a
/// surrogate pair). Quotes, backslashes and control characters are escaped
/// by serde_json before a fragment ever reaches this formatter.
struct AsciiFormatter<'a> {
    pretty: PrettyFormatter<'a>,
}

impl<'a> AsciiFormatter<'a> {
    fn new(pretty: PrettyFormatter<'a>) -> Self {
        Self { pretty }
    }
}

impl Formatter for AsciiFormatter<'_> {
    fn begin_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_array(writer)
    }

    fn end_array<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object(writer)
    }

    fn end_object<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.pretty.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.pretty.end_object_value(writer)
    }

    fn write_string_fragment<W: ?Sized + Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        let mut plain_from = 0;
        for (at, c) in fragment.char_indices() {
            if c.is_ascii() && c != '\x7f' {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[plain_from..at])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units).iter() {
                write!(writer, "\\u{:04x}", unit)?;
            }
            plain_from = at + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[plain_from..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn record(func_name: &str, path: &str) -> ProbeRecord {
        ProbeRecord {
            func_name: func_name.to_string(),
            line: 16,
            path: path.to_string(),
            samples: 1,
            type_comments: vec!["(str) -> str".to_string()],
        }
    }

    fn render(records: &[ProbeRecord]) -> String {
        let mut writer = JsonWriter::new(Vec::new());
        writer.write_records(records).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn test_json_layout_matches_type_info_format() {
        let expected = indoc! {r#"
            [
                {
                    "func_name": "Dog.bark",
                    "line": 16,
                    "path": "example.py",
                    "samples": 1,
                    "type_comments": [
                        "(str) -> str"
                    ]
                }
            ]"#};

        assert_eq!(render(&[record("Dog.bark", "example.py")]), expected);
    }

    #[test]
    fn test_empty_record_list() {
        assert_eq!(render(&[]), "[]");
    }

    #[test]
    fn test_non_ascii_is_escaped_like_ensure_ascii() {
        let output = render(&[record("Собака.лай", "зоопарк/собака.py")]);

        assert!(output.is_ascii());
        assert!(output.contains(
            r#""func_name": "\u0421\u043e\u0431\u0430\u043a\u0430.\u043b\u0430\u0439""#
        ));
        assert!(output.contains(
            r#""path": "\u0437\u043e\u043e\u043f\u0430\u0440\u043a/\u0441\u043e\u0431\u0430\u043a\u0430.py""#
        ));
    }

    #[test]
    fn test_astral_characters_become_surrogate_pairs() {
        let output = render(&[record("f", "🐕\u{7f}\"é.py")]);
        assert!(output.contains(r#""path": "\ud83d\udc15\u007f\"\u00e9.py""#));
    }
}
