//! Token reader for one format version.

use ase_core::{AseError, Result};
use ase_math::{Interval, Point3, Vector3, DVec3};

use super::token::Token;
use super::version::{check_version, field_present, Field};

/// Reads the tokens of a record written in `version`. Fields the version
/// predates are absent; callers substitute defaults when `has` is false.
#[derive(Debug)]
pub struct RestoreReader {
    version: u32,
    tokens: Vec<Token>,
    pos: usize,
}

impl RestoreReader {
    pub fn new(tokens: Vec<Token>, version: u32) -> Result<Self> {
        check_version(version)?;
        Ok(Self {
            version,
            tokens,
            pos: 0,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn has(&self, field: Field) -> bool {
        field_present(field, self.version)
    }

    fn advance(&mut self) -> Result<&Token> {
        if self.pos >= self.tokens.len() {
            return Err(AseError::Restore("Unexpected end of tokens".into()));
        }
        let tok = &self.tokens[self.pos];
        self.pos += 1;
        Ok(tok)
    }

    pub fn ident(&mut self) -> Result<String> {
        match self.advance()? {
            Token::Ident(name) => Ok(name.clone()),
            other => Err(AseError::Restore(format!("Expected identifier, got {other:?}"))),
        }
    }

    pub fn expect_ident(&mut self, name: &str) -> Result<()> {
        let found = self.ident()?;
        if found != name {
            return Err(AseError::Restore(format!("Expected '{name}', got '{found}'")));
        }
        Ok(())
    }

    pub fn real(&mut self) -> Result<f64> {
        match self.advance()? {
            Token::Real(v) => Ok(*v),
            other => Err(AseError::Restore(format!("Expected real, got {other:?}"))),
        }
    }

    pub fn vector(&mut self) -> Result<Vector3> {
        Ok(DVec3::new(self.real()?, self.real()?, self.real()?))
    }

    pub fn point(&mut self) -> Result<Point3> {
        self.vector()
    }

    /// A flag written as one of two named tokens, `(when_false, when_true)`.
    pub fn logical(&mut self, names: (&str, &str)) -> Result<bool> {
        let found = self.ident()?;
        if found == names.0 {
            Ok(false)
        } else if found == names.1 {
            Ok(true)
        } else {
            Err(AseError::Restore(format!(
                "Expected '{}' or '{}', got '{found}'",
                names.0, names.1
            )))
        }
    }

    pub fn interval(&mut self) -> Result<Interval> {
        let lo = self.interval_end(f64::NEG_INFINITY)?;
        let hi = self.interval_end(f64::INFINITY)?;
        Ok(Interval { lo, hi })
    }

    fn interval_end(&mut self, unbounded: f64) -> Result<f64> {
        match self.advance()? {
            Token::Infinite => Ok(unbounded),
            Token::Finite => self.real(),
            other => Err(AseError::Restore(format!("Expected interval end, got {other:?}"))),
        }
    }

    /// Consume the end-of-record marker.
    pub fn finish(&mut self) -> Result<()> {
        match self.advance()? {
            Token::End => Ok(()),
            other => Err(AseError::Restore(format!("Expected end of record, got {other:?}"))),
        }
    }

    /// Whether every token has been consumed.
    pub fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }
}
