//! Stable binary term encoding: a stable binary serialization of an RDF
//! term, used as the dictionary's column-family key/value payload.
//!
//! Layout: one discriminant byte, then the fields needed to reconstruct the
//! term. Strings are length-prefixed (`u32` little-endian) UTF-8. This is
//! not meant to sort meaningfully — only the index layer's integer-ID keys
//! need to sort; term bytes are only ever looked up by exact dictionary key
//! or decoded back into a `Term`.

use byteorder::{ByteOrder, LittleEndian};
use sparql_model::term::{BlankNode, Literal, NamedNode};
use sparql_model::Term;

use crate::error::{StorageError, StorageResult};

const TAG_NAMED_NODE: u8 = 0;
const TAG_BLANK_NODE: u8 = 1;
const TAG_SIMPLE_LITERAL: u8 = 2;
const TAG_TYPED_LITERAL: u8 = 3;
const TAG_LANG_LITERAL: u8 = 4;

fn write_string(buf: &mut Vec<u8>, s: &str) {
    let mut len_bytes = [0u8; 4];
    LittleEndian::write_u32(&mut len_bytes, s.len() as u32);
    buf.extend_from_slice(&len_bytes);
    buf.extend_from_slice(s.as_bytes());
}

fn read_string<'a>(bytes: &'a [u8], cursor: &mut usize) -> StorageResult<&'a str> {
    if bytes.len() < *cursor + 4 {
        return Err(StorageError::CorruptTerm(0));
    }
    let len = LittleEndian::read_u32(&bytes[*cursor..*cursor + 4]) as usize;
    *cursor += 4;
    if bytes.len() < *cursor + len {
        return Err(StorageError::CorruptTerm(0));
    }
    let s = std::str::from_utf8(&bytes[*cursor..*cursor + len])
        .map_err(|_| StorageError::CorruptTerm(0))?;
    *cursor += len;
    Ok(s)
}

/// Encodes a term to its stable binary form.
#[must_use]
pub fn encode_term(term: &Term) -> Vec<u8> {
    let mut buf = Vec::with_capacity(16);
    match term {
        Term::NamedNode(n) => {
            buf.push(TAG_NAMED_NODE);
            write_string(&mut buf, n.as_str());
        }
        Term::BlankNode(b) => {
            buf.push(TAG_BLANK_NODE);
            write_string(&mut buf, b.as_str());
        }
        Term::Literal(Literal::Simple(s)) => {
            buf.push(TAG_SIMPLE_LITERAL);
            write_string(&mut buf, s);
        }
        Term::Literal(Literal::Typed(s, dt)) => {
            buf.push(TAG_TYPED_LITERAL);
            write_string(&mut buf, s);
            write_string(&mut buf, dt.as_str());
        }
        Term::Literal(Literal::LangTagged(s, lang)) => {
            buf.push(TAG_LANG_LITERAL);
            write_string(&mut buf, s);
            write_string(&mut buf, lang);
        }
    }
    buf
}

/// Decodes a term from its stable binary form.
///
/// # Errors
///
/// Returns [`StorageError::CorruptTerm`] if `bytes` is not a well-formed
/// encoding produced by [`encode_term`].
pub fn decode_term(bytes: &[u8]) -> StorageResult<Term> {
    if bytes.is_empty() {
        return Err(StorageError::CorruptTerm(0));
    }
    let mut cursor = 1;
    let term = match bytes[0] {
        TAG_NAMED_NODE => Term::NamedNode(NamedNode::new(read_string(bytes, &mut cursor)?.to_string())),
        TAG_BLANK_NODE => Term::BlankNode(BlankNode::new(read_string(bytes, &mut cursor)?.to_string())),
        TAG_SIMPLE_LITERAL => Term::Literal(Literal::simple(read_string(bytes, &mut cursor)?.to_string())),
        TAG_TYPED_LITERAL => {
            let lexical = read_string(bytes, &mut cursor)?.to_string();
            let datatype = read_string(bytes, &mut cursor)?.to_string();
            Term::Literal(Literal::typed(lexical, NamedNode::new(datatype)))
        }
        TAG_LANG_LITERAL => {
            let lexical = read_string(bytes, &mut cursor)?.to_string();
            let lang = read_string(bytes, &mut cursor)?.to_string();
            Term::Literal(Literal::lang_tagged(lexical, lang))
        }
        _ => return Err(StorageError::CorruptTerm(0)),
    };
    Ok(term)
}
