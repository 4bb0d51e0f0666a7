//! Binary serialization of Micheline, as produced by the `PACK` instruction
//!
//! A packed value is the byte `0x05` followed by the binary form of its
//! Micheline node. Each node starts with a one-byte tag:
//!
//! | tag | node |
//! |---|---|
//! | `0x00` | integer, in [zarith](crate::zarith) form |
//! | `0x01` | string, as a `u32` length followed by UTF-8 |
//! | `0x02` | sequence, as a `u32` byte-length followed by its elements |
//! | `0x03`..`0x08` | primitive with 0, 1, or 2 arguments, without or with annotations |
//! | `0x09` | primitive with any number of arguments and annotations |
//! | `0x0a` | byte-string, as a `u32` length followed by the raw bytes |
//!
//! Primitive codes are those of [`crate::micheline::prim`]. Only the
//! untyped form is produced: addresses, keys, and signatures are packed as
//! the strings they are given as, rather than in their optimized binary
//! form, so hashes of packed values that contain them will not match those
//! computed on-chain from typed values.

use crate::conv::error::DecodeError;
use crate::conv::target::Target;
use crate::error::HexConvError;
use crate::hexstring::util::{bytes_of_hex, hex_of_bytes};
use crate::micheline::prim::{self, PrimKind};
use crate::micheline::{Micheline, MichelineType, MAX_DEPTH};
use crate::parse::{ByteParser, ParseError, ParseResult, TokenError};
use crate::zarith::{read_z, write_z};

/// Prefix byte of every packed value
pub const PACK_PREFIX: u8 = 0x05;

const TAG_INT: u8 = 0x00;
const TAG_STRING: u8 = 0x01;
const TAG_SEQ: u8 = 0x02;
const TAG_PRIM: u8 = 0x03;
const TAG_APP: u8 = 0x09;
const TAG_BYTES: u8 = 0x0a;

/// Error type for failures in packing or unpacking
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    /// Buffer could not be read as binary Micheline
    Parse(ParseError),
    /// Byte-string node or input did not hold valid hex
    Hex(HexConvError),
    /// Binary Micheline was well-formed but is not a valid data node
    Decode(DecodeError),
    /// Buffer did not start with the pack prefix
    Prefix(u8),
    /// Payload too long to be given a `u32` length prefix
    Oversize(usize),
}

impl std::fmt::Display for PackError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackError::Parse(err) => write!(f, "cannot unpack: {err}"),
            PackError::Hex(err) => write!(f, "invalid byte-string: {err}"),
            PackError::Decode(err) => write!(f, "invalid packed node: {err}"),
            PackError::Prefix(byte) => {
                write!(f, "expected pack prefix 0x{PACK_PREFIX:02x}, found 0x{byte:02x}")
            }
            PackError::Oversize(len) => {
                write!(f, "payload of {len} bytes exceeds the maximum length of a packed segment")
            }
        }
    }
}

impl std::error::Error for PackError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PackError::Parse(err) => Some(err),
            PackError::Hex(err) => Some(err),
            PackError::Decode(err) => Some(err),
            PackError::Prefix(_) | PackError::Oversize(_) => None,
        }
    }
}

impl From<ParseError> for PackError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<HexConvError> for PackError {
    fn from(err: HexConvError) -> Self {
        Self::Hex(err)
    }
}

impl From<DecodeError> for PackError {
    fn from(err: DecodeError) -> Self {
        Self::Decode(err)
    }
}

pub type PackResult<T> = std::result::Result<T, PackError>;

/// Packs a Micheline data node
///
/// # Errors
///
/// Fails if a byte-string node does not hold valid hex, or if any string,
/// byte-string, or sequence is too long to be length-prefixed.
pub fn pack(node: &Micheline) -> PackResult<Vec<u8>> {
    let mut buf: Vec<u8> = Target::create();
    buf.push_one(PACK_PREFIX);
    write_data(node, &mut buf)?;
    Ok(buf)
}

/// Packs a Micheline type node, including its annotations
pub fn pack_type(ty: &MichelineType) -> PackResult<Vec<u8>> {
    let mut buf: Vec<u8> = Target::create();
    buf.push_one(PACK_PREFIX);
    write_type(ty, &mut buf)?;
    Ok(buf)
}

/// Hex-encoded form of [`pack`]
pub fn pack_hex(node: &Micheline) -> PackResult<String> {
    pack(node).map(|bytes| hex_of_bytes(&bytes))
}

/// Reads a packed Micheline data node
///
/// # Errors
///
/// Fails if the buffer does not start with [`PACK_PREFIX`], if it is not
/// well-formed binary Micheline, if it holds a type or an annotated node
/// rather than data, if any bytes remain after the node, or if the node is
/// nested deeper than [`MAX_DEPTH`].
pub fn unpack(bytes: &[u8]) -> PackResult<Micheline> {
    let mut p = ByteParser::new(bytes);
    match p.get_u8()? {
        PACK_PREFIX => {}
        other => return Err(PackError::Prefix(other)),
    }
    let node = read_data(&mut p, 0)?;
    p.finish()?;
    Ok(node)
}

/// Reads a packed Micheline data node from its hex-encoded form
pub fn unpack_hex(hex: &str) -> PackResult<Micheline> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    unpack(&bytes_of_hex(hex)?)
}

fn write_dynamic<U: Target>(payload: &[u8], buf: &mut U) -> PackResult<usize> {
    let len = u32::try_from(payload.len()).map_err(|_| PackError::Oversize(payload.len()))?;
    buf.anticipate(4 + payload.len());
    Ok(buf.push_many(len.to_be_bytes()) + buf.push_all(payload))
}

/// Header of a primitive application with a fixed number of arguments
fn write_prim_header<U: Target>(code: u8, n_args: u8, annotated: bool, buf: &mut U) -> usize {
    buf.push_many([TAG_PRIM + 2 * n_args + u8::from(annotated), code])
}

fn write_annots<U: Target>(annots: &[String], buf: &mut U) -> PackResult<usize> {
    write_dynamic(annots.join(" ").as_bytes(), buf)
}

fn write_data<U: Target>(node: &Micheline, buf: &mut U) -> PackResult<usize> {
    let n = match node {
        Micheline::Int(i) => buf.push_one(TAG_INT) + write_z(i, buf),
        Micheline::String(s) => buf.push_one(TAG_STRING) + write_dynamic(s.as_bytes(), buf)?,
        Micheline::Bytes(hex) => {
            buf.push_one(TAG_BYTES) + write_dynamic(&bytes_of_hex(hex)?, buf)?
        }
        Micheline::Prim(p) => write_prim_header(p.code(), 0, false, buf),
        Micheline::Single(p, arg) => {
            write_prim_header(p.code(), 1, false, buf) + write_data(arg, buf)?
        }
        Micheline::Pair(args) => match args.as_slice() {
            [fst, snd] => {
                write_prim_header(prim::PAIR_CODE, 2, false, buf)
                    + write_data(fst, buf)?
                    + write_data(snd, buf)?
            }
            _ => {
                buf.push_many([TAG_APP, prim::PAIR_CODE])
                    + write_data_seq(args, buf)?
                    + write_annots(&[], buf)?
            }
        },
        Micheline::Elt(key, val) => {
            write_prim_header(prim::ELT_CODE, 2, false, buf)
                + write_data(key, buf)?
                + write_data(val, buf)?
        }
        Micheline::Seq(elems) => buf.push_one(TAG_SEQ) + write_data_seq(elems, buf)?,
    };
    Ok(n + buf.resolve_zero())
}

fn write_data_seq<U: Target>(elems: &[Micheline], buf: &mut U) -> PackResult<usize> {
    let mut inner: Vec<u8> = Target::create();
    for elem in elems {
        write_data(elem, &mut inner)?;
    }
    write_dynamic(&inner, buf)
}

fn write_type<U: Target>(ty: &MichelineType, buf: &mut U) -> PackResult<usize> {
    let annots = ty.annots();
    let annotated = !annots.is_empty();
    let n = match ty {
        MichelineType::Prim { prim, .. } => write_prim_header(prim.code(), 0, annotated, buf),
        MichelineType::Unary { prim, arg, .. } => {
            write_prim_header(prim.code(), 1, annotated, buf) + write_type(arg, buf)?
        }
        MichelineType::Binary { prim, args, .. } => {
            write_prim_header(prim.code(), 2, annotated, buf)
                + write_type(&args.0, buf)?
                + write_type(&args.1, buf)?
        }
        MichelineType::Sapling { prim, memo_size, .. } => {
            write_prim_header(prim.code(), 1, annotated, buf)
                + buf.push_one(TAG_INT)
                + write_z(&(*memo_size).into(), buf)
        }
        MichelineType::Pair { args, .. } => match args.as_slice() {
            [fst, snd] => {
                write_prim_header(prim::PAIR_TYPE_CODE, 2, annotated, buf)
                    + write_type(fst, buf)?
                    + write_type(snd, buf)?
            }
            _ => {
                let mut inner: Vec<u8> = Target::create();
                for arg in args {
                    write_type(arg, &mut inner)?;
                }
                // generic applications always carry an annotation segment
                return Ok(buf.push_many([TAG_APP, prim::PAIR_TYPE_CODE])
                    + write_dynamic(&inner, buf)?
                    + write_annots(annots, buf)?
                    + buf.resolve_zero());
            }
        },
    };
    let n = if annotated { n + write_annots(annots, buf)? } else { n };
    Ok(n + buf.resolve_zero())
}

fn dynamic_bytes<'a>(p: &mut ByteParser<'a>) -> ParseResult<&'a [u8]> {
    let mut sub = p.split_dynamic()?;
    sub.consume(sub.remainder())
}

fn read_prim(p: &mut ByteParser<'_>) -> PackResult<PrimKind> {
    let code = p.get_u8()?;
    prim::by_code(code).ok_or_else(|| {
        log::debug!("unknown primitive code 0x{code:02x} at byte {}", p.offset() - 1);
        ParseError::from(TokenError::InvalidTag { what: "primitive", byte: code }).into()
    })
}

fn read_data_seq(p: &mut ByteParser<'_>, depth: usize) -> PackResult<Vec<Micheline>> {
    let mut sub = p.split_dynamic()?;
    let mut elems = Vec::new();
    while !sub.is_empty() {
        elems.push(read_data(&mut sub, depth)?);
    }
    Ok(elems)
}

fn read_data(p: &mut ByteParser<'_>, depth: usize) -> PackResult<Micheline> {
    if depth >= MAX_DEPTH {
        log::debug!("packed node nested past depth {MAX_DEPTH} at byte {}", p.offset());
        return Err(ParseError::from(TokenError::TooDeep { limit: MAX_DEPTH }).into());
    }
    let depth = depth + 1;
    let tag = p.get_u8()?;
    match tag {
        TAG_INT => Ok(Micheline::Int(read_z(p)?)),
        TAG_STRING => {
            let raw = dynamic_bytes(p)?.to_vec();
            Ok(Micheline::String(String::from_utf8(raw).map_err(ParseError::from)?))
        }
        TAG_BYTES => Ok(Micheline::bytes_of(dynamic_bytes(p)?)),
        TAG_SEQ => Ok(Micheline::Seq(read_data_seq(p, depth)?)),
        0x03 => match read_prim(p)? {
            PrimKind::Nullary(n) => Ok(Micheline::Prim(n)),
            other => Err(DecodeError::unexpected("nullary data constructor", other).into()),
        },
        0x05 => match read_prim(p)? {
            PrimKind::Unary(u) => Ok(Micheline::Single(u, Box::new(read_data(p, depth)?))),
            other => Err(DecodeError::unexpected("unary data constructor", other).into()),
        },
        0x07 => {
            let kind = read_prim(p)?;
            if !matches!(kind, PrimKind::Pair | PrimKind::Elt) {
                return Err(DecodeError::unexpected("Pair or Elt", kind).into());
            }
            let fst = read_data(p, depth)?;
            let snd = read_data(p, depth)?;
            Ok(match kind {
                PrimKind::Elt => Micheline::elt(fst, snd),
                _ => Micheline::pair(fst, snd),
            })
        }
        TAG_APP => {
            let kind = read_prim(p)?;
            if kind != PrimKind::Pair {
                return Err(DecodeError::unexpected("Pair", kind).into());
            }
            let args = read_data_seq(p, depth)?;
            if !dynamic_bytes(p)?.is_empty() {
                return Err(DecodeError::unexpected("unannotated data node", "annotated Pair").into());
            }
            Ok(Micheline::try_pair(args)?)
        }
        0x04 | 0x06 | 0x08 => {
            let found = format!("annotated node (tag 0x{tag:02x})");
            Err(DecodeError::unexpected("unannotated data node", found).into())
        }
        byte => Err(ParseError::from(TokenError::InvalidTag { what: "node", byte }).into()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::micheline::{BinaryTypePrim, TypePrim};

    fn hex(node: &Micheline) -> String {
        pack_hex(node).unwrap()
    }

    #[test]
    fn known_data_encodings() {
        assert_eq!(hex(&Micheline::int(2)), "050002");
        assert_eq!(hex(&Micheline::string("foo")), "050100000003666f6f");
        assert_eq!(hex(&Micheline::pair(Micheline::int(1), Micheline::int(2))), "05070700010002");
        assert_eq!(hex(&Micheline::some(Micheline::unit())), "050509030b");
        assert_eq!(hex(&Micheline::boolean(true)), "05030a");
        assert_eq!(hex(&Micheline::bytes("cafe")), "050a00000002cafe");
        assert_eq!(
            hex(&Micheline::seq([Micheline::int(1), Micheline::int(2)])),
            "05020000000400010002"
        );
        assert_eq!(
            hex(&Micheline::Pair(vec![Micheline::int(1), Micheline::int(2), Micheline::int(3)])),
            "0509070000000600010002000300000000"
        );
        assert_eq!(
            hex(&Micheline::seq([Micheline::elt(Micheline::string("a"), Micheline::int(1))])),
            "05020000000a07040100000001610001"
        );
    }

    #[test]
    fn known_type_encodings() {
        let packed = |ty: MichelineType| hex_of_bytes(&pack_type(&ty).unwrap());
        assert_eq!(packed(TypePrim::nat.into()), "050362");
        assert_eq!(
            packed(MichelineType::prim(TypePrim::nat).with_field("a")),
            "050462000000022561"
        );
        assert_eq!(
            packed(MichelineType::pair(TypePrim::nat.into(), TypePrim::int.into())),
            "0507650362035b"
        );
        assert_eq!(
            packed(MichelineType::binary(
                BinaryTypePrim::map,
                TypePrim::string.into(),
                TypePrim::nat.into()
            )),
            "05076003680362"
        );
    }

    #[test]
    fn unpack_inverts_pack() {
        let node = Micheline::seq([
            Micheline::elt(Micheline::string("k"), Micheline::left(Micheline::int(-100_000))),
            Micheline::elt(
                Micheline::bytes("00ff"),
                Micheline::Pair(vec![Micheline::none(), Micheline::unit(), Micheline::boolean(false)]),
            ),
        ]);
        let packed = pack(&node).unwrap();
        assert_eq!(unpack(&packed), Ok(node.clone()));
        assert_eq!(unpack_hex(&format!("0x{}", hex_of_bytes(&packed))), Ok(node));
    }

    #[test]
    fn unpack_rejects_malformed() {
        assert_eq!(unpack(&[0x06, 0x00, 0x02]), Err(PackError::Prefix(0x06)));
        assert!(matches!(unpack(&[]), Err(PackError::Parse(_))));
        assert!(matches!(unpack(&[0x05, 0x00, 0x02, 0x00]), Err(PackError::Parse(_))));
        assert!(matches!(unpack(&[0x05, 0x03, 0x62]), Err(PackError::Decode(_))));
        assert!(matches!(unpack(&[0x05, 0x03, 0xff]), Err(PackError::Parse(_))));
        assert!(matches!(unpack(&[0x05, 0x0b]), Err(PackError::Parse(_))));
        assert!(matches!(unpack_hex("05zz"), Err(PackError::Hex(_))));
        assert!(matches!(pack(&Micheline::bytes("abc")), Err(PackError::Hex(_))));
    }

    fn nested_somes(depth: usize) -> Vec<u8> {
        let mut buf = vec![PACK_PREFIX];
        for _ in 0..depth {
            buf.extend_from_slice(&[0x05, 0x09]);
        }
        buf.extend_from_slice(&[0x03, 0x0b]);
        buf
    }

    #[test]
    fn unpack_bounds_depth() {
        let node = unpack(&nested_somes(MAX_DEPTH - 1)).unwrap();
        assert_eq!(pack(&node).unwrap(), nested_somes(MAX_DEPTH - 1));
        assert_eq!(
            unpack(&nested_somes(MAX_DEPTH)),
            Err(PackError::Parse(ParseError::Token(TokenError::TooDeep { limit: MAX_DEPTH })))
        );
        assert!(matches!(unpack(&nested_somes(2_000_000)), Err(PackError::Parse(_))));

        let mut seqs = vec![PACK_PREFIX];
        for level in 0..MAX_DEPTH + 1 {
            let remaining = (MAX_DEPTH - level) as u32 * 5;
            seqs.push(0x02);
            seqs.extend_from_slice(&remaining.to_be_bytes());
        }
        assert!(matches!(unpack(&seqs), Err(PackError::Parse(_))));
    }
}
