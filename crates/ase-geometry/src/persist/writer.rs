//! Token writer for one format version.

use ase_core::Result;
use ase_math::{Interval, Point3, Vector3};

use super::token::Token;
use super::version::{check_version, field_present, Field};

/// Collects the tokens of a record, omitting fields the target version
/// does not know.
#[derive(Debug)]
pub struct SaveWriter {
    version: u32,
    tokens: Vec<Token>,
}

impl SaveWriter {
    pub fn new(version: u32) -> Result<Self> {
        check_version(version)?;
        Ok(Self {
            version,
            tokens: Vec::new(),
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether the target version carries `field`.
    pub fn has(&self, field: Field) -> bool {
        field_present(field, self.version)
    }

    pub fn ident(&mut self, name: &str) {
        self.tokens.push(Token::Ident(name.to_string()));
    }

    pub fn real(&mut self, v: f64) {
        self.tokens.push(Token::Real(v));
    }

    pub fn vector(&mut self, v: Vector3) {
        self.real(v.x);
        self.real(v.y);
        self.real(v.z);
    }

    pub fn point(&mut self, p: Point3) {
        self.vector(p);
    }

    /// A flag as one of two named tokens, `(when_false, when_true)`.
    pub fn logical(&mut self, flag: bool, names: (&str, &str)) {
        self.ident(if flag { names.1 } else { names.0 });
    }

    pub fn interval(&mut self, iv: &Interval) {
        for end in [iv.lo, iv.hi] {
            if end.is_finite() {
                self.tokens.push(Token::Finite);
                self.real(end);
            } else {
                self.tokens.push(Token::Infinite);
            }
        }
    }

    /// Close the record and return its tokens.
    pub fn finish(mut self) -> Vec<Token> {
        self.tokens.push(Token::End);
        self.tokens
    }
}
