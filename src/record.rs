//! Decoding of a cell payload into a sequence of typed column [`Value`]s.
//!
//! A record is a length-prefixed serial-type header followed by the packed
//! column bodies; each serial type names both the value's kind and its
//! on-disk width.

use crate::error::{AntdbError, Result};
use crate::value::Value;
use crate::varint::read_varint;

/// Database text encoding, from file header byte 56.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl TextEncoding {
    pub fn from_header_value(value: u32) -> Result<Self> {
        match value {
            1 => Ok(TextEncoding::Utf8),
            2 => Ok(TextEncoding::Utf16Le),
            3 => Ok(TextEncoding::Utf16Be),
            other => Err(AntdbError::storage(format!(
                "invalid text encoding byte: {other}"
            ))),
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes.to_vec())
                .map_err(|e| AntdbError::storage(format!("invalid utf-8 text: {e}"))),
            TextEncoding::Utf16Le => {
                decode_utf16(bytes, u16::from_le_bytes)
            }
            TextEncoding::Utf16Be => {
                decode_utf16(bytes, u16::from_be_bytes)
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], unit_from: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(AntdbError::storage("utf-16 text has odd byte length"));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| unit_from([c[0], c[1]]))
        .collect();
    String::from_utf16(&units).map_err(|e| AntdbError::storage(format!("invalid utf-16 text: {e}")))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub values: Vec<Value>,
}

/// One entry of the serial-type header: how many body bytes it occupies and
/// what kind of value it decodes to.
enum SerialType {
    Null,
    I8,
    I16,
    I24,
    I32,
    ZeroInt,
    OneInt,
    Blob(usize),
    Str(usize),
}

impl SerialType {
    fn from_code(code: i64) -> Result<Self> {
        match code {
            0 => Ok(SerialType::Null),
            1 => Ok(SerialType::I8),
            2 => Ok(SerialType::I16),
            3 => Ok(SerialType::I24),
            4 => Ok(SerialType::I32),
            8 => Ok(SerialType::ZeroInt),
            9 => Ok(SerialType::OneInt),
            n if n >= 12 && n % 2 == 0 => Ok(SerialType::Blob(((n - 12) / 2) as usize)),
            n if n >= 13 && n % 2 != 0 => Ok(SerialType::Str(((n - 13) / 2) as usize)),
            // 5 (i48), 6 (i64), 7 (float), and 10/11 (internal/reserved) are
            // not produced by this subset's column bodies.
            other => Err(AntdbError::storage(format!(
                "unsupported serial type: {other}"
            ))),
        }
    }

    fn body_len(&self) -> usize {
        match self {
            SerialType::Null | SerialType::ZeroInt | SerialType::OneInt => 0,
            SerialType::I8 => 1,
            SerialType::I16 => 2,
            SerialType::I24 => 3,
            SerialType::I32 => 4,
            SerialType::Blob(n) | SerialType::Str(n) => *n,
        }
    }
}

impl Record {
    /// Parses a record from a cell payload slice.
    pub fn parse(payload: &[u8], encoding: TextEncoding) -> Result<Record> {
        let (header_len, header_len_size) = read_varint(payload)?;
        let header_len = header_len as usize;
        if header_len > payload.len() {
            return Err(AntdbError::storage("record header longer than payload"));
        }

        let mut serial_types = Vec::new();
        let mut cursor = header_len_size;
        while cursor < header_len {
            let (code, consumed) = read_varint(&payload[cursor..])?;
            serial_types.push(SerialType::from_code(code)?);
            cursor += consumed;
        }

        let mut values = Vec::with_capacity(serial_types.len());
        let mut body_cursor = header_len;
        for serial_type in serial_types {
            let len = serial_type.body_len();
            if body_cursor + len > payload.len() {
                return Err(AntdbError::storage("record body shorter than declared"));
            }
            let body = &payload[body_cursor..body_cursor + len];
            let value = match serial_type {
                SerialType::Null => Value::Null,
                SerialType::I8 => Value::Int(body[0] as i8 as i64),
                SerialType::I16 => Value::Int(i16::from_be_bytes([body[0], body[1]]) as i64),
                SerialType::I24 => Value::Int(sign_extend(body, 3)),
                SerialType::I32 => {
                    Value::Int(i32::from_be_bytes([body[0], body[1], body[2], body[3]]) as i64)
                }
                SerialType::ZeroInt => Value::Int(0),
                SerialType::OneInt => Value::Int(1),
                SerialType::Blob(_) => Value::Blob(body.to_vec()),
                SerialType::Str(_) => Value::Str(encoding.decode(body)?),
            };
            values.push(value);
            body_cursor += len;
        }

        Ok(Record { values })
    }
}

/// Sign-extends a big-endian two's-complement integer of `len` bytes (< 8) to i64.
fn sign_extend(body: &[u8], len: usize) -> i64 {
    let mut bytes = [0u8; 8];
    let negative = body[0] & 0x80 != 0;
    if negative {
        bytes = [0xffu8; 8];
    }
    bytes[8 - len..].copy_from_slice(body);
    i64::from_be_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a record payload: one null, the integer 1000, and the text "hi".
    fn sample_payload() -> Vec<u8> {
        // Serial types: 0 (null), 2 (i16), 13+2*2=17 (4-byte text "hi")
        let header: Vec<u8> = vec![0, 2, 17];
        let header_len = (header.len() + 1) as u8; // +1 for its own varint byte
        let mut payload = vec![header_len];
        payload.extend(header);
        payload.extend(1000i16.to_be_bytes());
        payload.extend(b"hi");
        payload
    }

    #[test]
    fn decodes_mixed_record() {
        let payload = sample_payload();
        let record = Record::parse(&payload, TextEncoding::Utf8).unwrap();
        assert_eq!(
            record.values,
            vec![Value::Null, Value::Int(1000), Value::Str("hi".to_string())]
        );
    }

    #[test]
    fn decodes_zero_and_one_int_serial_types() {
        // header: len byte, then serial types 8 and 9 (no body bytes).
        let payload = vec![3, 8, 9];
        let record = Record::parse(&payload, TextEncoding::Utf8).unwrap();
        assert_eq!(record.values, vec![Value::Int(0), Value::Int(1)]);
    }

    #[test]
    fn decodes_blob() {
        // serial type 12 -> blob of length 0; serial type 14 -> blob of length 1.
        let header = vec![14];
        let header_len = (header.len() + 1) as u8;
        let mut payload = vec![header_len];
        payload.extend(header);
        payload.push(0xab);
        let record = Record::parse(&payload, TextEncoding::Utf8).unwrap();
        assert_eq!(record.values, vec![Value::Blob(vec![0xab])]);
    }

    #[test]
    fn rejects_unsupported_serial_type() {
        let payload = vec![2, 7]; // 7 = float, unsupported
        assert!(Record::parse(&payload, TextEncoding::Utf8).is_err());
    }

    #[test]
    fn negative_i24_sign_extends() {
        // -1 encoded as 3 bytes big-endian two's complement: 0xff 0xff 0xff
        let header = vec![3];
        let header_len = (header.len() + 1) as u8;
        let mut payload = vec![header_len];
        payload.extend(header);
        payload.extend([0xff, 0xff, 0xff]);
        let record = Record::parse(&payload, TextEncoding::Utf8).unwrap();
        assert_eq!(record.values, vec![Value::Int(-1)]);
    }
}
