//! Type expression parser
//!
//! Grammar:
//!
//! ```text
//! type     := elem suffix*
//! elem     := "tuple" "(" field ("," field)* ")" | IDENT
//! field    := type [IDENT]
//! suffix   := "[" [NUMBER] "]"
//! ```
//!
//! `uint`/`int` without a width alias to 256 bits, `byte` aliases `bytes1`.
//! The suffix chain binds outermost-last: `T[a][b]` is an array of length
//! `b` whose elements are `T[a]`.

use crate::error::AbiError;
use crate::types::{TupleField, Type};

/// Maximum type nesting depth, guarding against stack exhaustion.
pub(crate) const MAX_DEPTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Number(usize),
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(s) => format!("'{}'", s),
            Token::Number(n) => format!("'{}'", n),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::LBracket => "'['".into(),
            Token::RBracket => "']'".into(),
            Token::Comma => "','".into(),
        }
    }
}

fn lex(input: &str) -> Result<Vec<Token>, AbiError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '0'..='9' => {
                let mut digits = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() {
                        digits.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let n: usize = digits
                    .parse()
                    .map_err(|_| AbiError::Parse(format!("number out of range: {}", digits)))?;
                tokens.push(Token::Number(n));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_alphanumeric() || d == '_' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            other => {
                return Err(AbiError::Parse(format!(
                    "unexpected character '{}' in type expression",
                    other
                )));
            }
        }
    }

    Ok(tokens)
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).cloned();
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Token) -> Result<(), AbiError> {
        match self.next() {
            Some(tok) if tok == expected => Ok(()),
            Some(tok) => Err(AbiError::Parse(format!(
                "expected {}, found {}",
                expected.describe(),
                tok.describe()
            ))),
            None => Err(AbiError::Parse(format!(
                "expected {}, found end of input",
                expected.describe()
            ))),
        }
    }

    fn parse_type(&mut self, depth: usize) -> Result<Type, AbiError> {
        if depth > MAX_DEPTH {
            return Err(AbiError::Parse(format!(
                "type nesting exceeds {} levels",
                MAX_DEPTH
            )));
        }

        let ty = self.parse_elem(depth)?;
        self.apply_suffixes(ty)
    }

    /// Consume a suffix chain. The outer suffix binds last.
    fn apply_suffixes(&mut self, mut ty: Type) -> Result<Type, AbiError> {
        while let Some(Token::LBracket) = self.peek() {
            self.next();
            match self.next() {
                Some(Token::RBracket) => {
                    ty = Type::Array(Box::new(ty));
                }
                Some(Token::Number(len)) => {
                    self.expect(Token::RBracket)?;
                    ty = Type::FixedArray(Box::new(ty), len);
                }
                Some(tok) => {
                    return Err(AbiError::Parse(format!(
                        "expected array length or ']', found {}",
                        tok.describe()
                    )));
                }
                None => {
                    return Err(AbiError::Parse("unclosed '[' in type expression".into()));
                }
            }
        }
        Ok(ty)
    }

    fn parse_elem(&mut self, depth: usize) -> Result<Type, AbiError> {
        match self.next() {
            Some(Token::Ident(name)) if name == "tuple" => self.parse_tuple(depth),
            Some(Token::Ident(name)) => elementary(&name),
            Some(tok) => Err(AbiError::Parse(format!(
                "expected type name, found {}",
                tok.describe()
            ))),
            None => Err(AbiError::Parse("empty type expression".into())),
        }
    }

    fn parse_tuple(&mut self, depth: usize) -> Result<Type, AbiError> {
        self.expect(Token::LParen)?;

        let mut fields: Vec<TupleField> = Vec::new();
        loop {
            let ty = self.parse_type(depth + 1)?;

            let name = match self.peek() {
                Some(Token::Ident(_)) => match self.next() {
                    Some(Token::Ident(name)) => name,
                    _ => unreachable!(),
                },
                _ => String::new(),
            };

            if !name.is_empty() && fields.iter().any(|f| f.name == name) {
                return Err(AbiError::Parse(format!(
                    "duplicate tuple field name '{}'",
                    name
                )));
            }
            fields.push(TupleField::new(name, ty));

            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                Some(tok) => {
                    return Err(AbiError::Parse(format!(
                        "expected ',' or ')' in tuple, found {}",
                        tok.describe()
                    )));
                }
                None => {
                    return Err(AbiError::Parse("unclosed tuple field list".into()));
                }
            }
        }

        Ok(Type::Tuple(fields))
    }
}

fn elementary(name: &str) -> Result<Type, AbiError> {
    match name {
        "address" => return Ok(Type::Address),
        "bool" => return Ok(Type::Bool),
        "string" => return Ok(Type::String),
        "bytes" => return Ok(Type::Bytes),
        "byte" => return Ok(Type::FixedBytes(1)),
        "function" => return Ok(Type::Function),
        _ => {}
    }

    if let Some(rest) = name.strip_prefix("uint") {
        return Ok(Type::Uint(int_width(name, rest)?));
    }
    if let Some(rest) = name.strip_prefix("int") {
        return Ok(Type::Int(int_width(name, rest)?));
    }
    if let Some(rest) = name.strip_prefix("bytes") {
        let size: usize = rest
            .parse()
            .map_err(|_| AbiError::Parse(format!("invalid bytes size in '{}'", name)))?;
        if size == 0 || size > 32 {
            return Err(AbiError::Parse(format!(
                "bytes size must be in 1..=32, got {}",
                size
            )));
        }
        return Ok(Type::FixedBytes(size));
    }

    Err(AbiError::Parse(format!("unknown type name '{}'", name)))
}

fn int_width(name: &str, rest: &str) -> Result<usize, AbiError> {
    if rest.is_empty() {
        return Ok(256);
    }
    let bits: usize = rest
        .parse()
        .map_err(|_| AbiError::Parse(format!("invalid integer width in '{}'", name)))?;
    if bits == 0 || bits > 256 || bits % 8 != 0 {
        return Err(AbiError::Parse(format!(
            "integer width must be a multiple of 8 in 8..=256, got {}",
            bits
        )));
    }
    Ok(bits)
}

/// Apply a textual suffix chain (e.g. `"[2][]"`) to an existing type.
pub(crate) fn parse_suffixes(base: Type, input: &str) -> Result<Type, AbiError> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let ty = parser.apply_suffixes(base)?;
    if let Some(tok) = parser.peek() {
        return Err(AbiError::Parse(format!(
            "trailing {} after array suffix",
            tok.describe()
        )));
    }
    Ok(ty)
}

/// Parse a textual type expression into a [`Type`] tree.
pub fn parse(input: &str) -> Result<Type, AbiError> {
    let tokens = lex(input)?;
    let mut parser = Parser { tokens, pos: 0 };
    let ty = parser.parse_type(0)?;
    if let Some(tok) = parser.peek() {
        return Err(AbiError::Parse(format!(
            "trailing {} after type expression",
            tok.describe()
        )));
    }
    Ok(ty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_elementary() {
        assert_eq!(parse("address").unwrap(), Type::Address);
        assert_eq!(parse("bool").unwrap(), Type::Bool);
        assert_eq!(parse("string").unwrap(), Type::String);
        assert_eq!(parse("bytes").unwrap(), Type::Bytes);
        assert_eq!(parse("function").unwrap(), Type::Function);
        assert_eq!(parse("uint256").unwrap(), Type::Uint(256));
        assert_eq!(parse("uint8").unwrap(), Type::Uint(8));
        assert_eq!(parse("int40").unwrap(), Type::Int(40));
        assert_eq!(parse("bytes32").unwrap(), Type::FixedBytes(32));
        assert_eq!(parse("bytes1").unwrap(), Type::FixedBytes(1));
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(parse("uint").unwrap(), Type::Uint(256));
        assert_eq!(parse("int").unwrap(), Type::Int(256));
        assert_eq!(parse("byte").unwrap(), Type::FixedBytes(1));
    }

    #[test]
    fn test_parse_rejects_bad_widths() {
        assert!(parse("uint0").is_err());
        assert!(parse("uint7").is_err());
        assert!(parse("uint264").is_err());
        assert!(parse("int12").is_err());
        assert!(parse("bytes0").is_err());
        assert!(parse("bytes33").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_names() {
        assert!(parse("foo").is_err());
        assert!(parse("uint256x").is_err());
        assert!(parse("bytes32x").is_err());
        assert!(parse("").is_err());
    }

    #[test]
    fn test_parse_array_suffixes() {
        assert_eq!(
            parse("uint8[]").unwrap(),
            Type::Array(Box::new(Type::Uint(8)))
        );
        assert_eq!(
            parse("uint8[2]").unwrap(),
            Type::FixedArray(Box::new(Type::Uint(8)), 2)
        );
        // Outer suffix binds last: uint8[2][3] is three arrays of two
        assert_eq!(
            parse("uint8[2][3]").unwrap(),
            Type::FixedArray(Box::new(Type::FixedArray(Box::new(Type::Uint(8)), 2)), 3)
        );
        assert_eq!(
            parse("uint8[][2]").unwrap(),
            Type::FixedArray(Box::new(Type::Array(Box::new(Type::Uint(8)))), 2)
        );
    }

    #[test]
    fn test_parse_unbalanced_brackets() {
        assert!(parse("uint8[").is_err());
        assert!(parse("uint8[2").is_err());
        assert!(parse("uint8]").is_err());
        assert!(parse("uint8[2]]").is_err());
        assert!(parse("uint8[a]").is_err());
    }

    #[test]
    fn test_parse_tuple() {
        let ty = parse("tuple(int32 a, int32[] b)").unwrap();
        assert_eq!(
            ty,
            Type::Tuple(vec![
                TupleField::new("a", Type::Int(32)),
                TupleField::new("b", Type::Array(Box::new(Type::Int(32)))),
            ])
        );
    }

    #[test]
    fn test_parse_tuple_unnamed_fields() {
        let ty = parse("tuple(int32, int32 b)").unwrap();
        match &ty {
            Type::Tuple(fields) => {
                assert_eq!(fields[0].name, "");
                assert_eq!(fields[1].name, "b");
            }
            other => panic!("expected tuple, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nested_tuple() {
        let ty = parse("tuple(tuple(int32 c, int32[] d) a, int32[] b)").unwrap();
        match &ty {
            Type::Tuple(fields) => {
                assert_eq!(fields.len(), 2);
                assert!(matches!(fields[0].ty, Type::Tuple(_)));
            }
            other => panic!("expected tuple, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tuple_array_suffix() {
        let ty = parse("tuple(int32 a, int32 b)[2]").unwrap();
        assert!(matches!(ty, Type::FixedArray(_, 2)));

        let ty = parse("tuple(uint16 a, uint16 b)[1][]").unwrap();
        match ty {
            Type::Array(inner) => assert!(matches!(*inner, Type::FixedArray(_, 1))),
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_malformed_tuples() {
        assert!(parse("tuple").is_err());
        assert!(parse("tuple(").is_err());
        assert!(parse("tuple()").is_err());
        assert!(parse("tuple(uint256").is_err());
        assert!(parse("tuple(uint256 a,)").is_err());
        assert!(parse("tuple(uint256 a b)").is_err());
    }

    #[test]
    fn test_parse_duplicate_field_names() {
        assert!(parse("tuple(uint8 a, uint8 a)").is_err());
        // Empty names never collide
        assert!(parse("tuple(uint8, uint8)").is_ok());
    }

    #[test]
    fn test_parse_whitespace() {
        assert_eq!(parse("  uint256 ").unwrap(), Type::Uint(256));
        assert_eq!(
            parse("tuple( int32 a , int32 b )").unwrap(),
            parse("tuple(int32 a,int32 b)").unwrap()
        );
    }

    #[test]
    fn test_parse_depth_cap() {
        // Parsing and dropping a MAX_DEPTH-deep nested type recurses
        // deeply enough (especially in debug builds) to need more than
        // the default test-thread stack.
        std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(|| {
                let mut expr = String::from("uint8");
                for _ in 0..(MAX_DEPTH + 8) {
                    expr.push_str("[]");
                }
                // Suffixes alone do not recurse; wrap in tuples to hit the cap
                let mut nested = String::from("uint8");
                for _ in 0..(MAX_DEPTH + 8) {
                    nested = format!("tuple({} a)", nested);
                }
                assert!(parse(&nested).is_err());
                // Suffix chains of any length stay iterative
                assert!(parse(&expr).is_ok());
            })
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn test_render_roundtrip() {
        for expr in [
            "uint256",
            "uint",
            "byte",
            "bytes24",
            "address[]",
            "uint32[2][3][4]",
            "tuple(int32 a, int32[2] b)",
            "tuple(bytes[] a)",
            "tuple(uint8[2] a, tuple(uint8 e, uint32 f)[2] b, uint16 c, uint64[2][1] d)",
            "tuple(int32, int32 b)[2][]",
            "tuple(string A, address B, uint256 C, bytes[] D, bytes[] E, address[] F, int256 G)",
        ] {
            let ty = parse(expr).unwrap();
            let rendered = ty.to_string();
            assert_eq!(parse(&rendered).unwrap(), ty, "render of {}", expr);
        }
    }
}
