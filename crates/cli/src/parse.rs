//! Text syntax for constraint systems.
//!
//! A system is a `;`-separated list of constraints over `x0, x1, ...`:
//! `x0 >= 0; x0 + 2x1 <= 5; 3/2 x1 - x0 > 1; x2 = 4`.
//! Relations: `>=`, `<=`, `>`, `<`, `=` (or `==`) and `!=`.

use std::collections::BTreeMap;

use anyhow::{anyhow, bail, Context, Result};
use num_rational::BigRational;
use num_traits::{One, Zero};
use polka::prelude::{Coeff, ConsKind, LinCons, LinExpr};

#[derive(Clone, Debug, PartialEq)]
enum Tok {
    Num(BigRational),
    Var(usize),
    Plus,
    Minus,
    Star,
}

fn tokenize(s: &str) -> Result<Vec<Tok>> {
    let chars: Vec<char> = s.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' => i += 1,
            '+' => {
                out.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                out.push(Tok::Minus);
                i += 1;
            }
            '*' => {
                out.push(Tok::Star);
                i += 1;
            }
            'x' => {
                let start = i + 1;
                let mut j = start;
                while j < chars.len() && chars[j].is_ascii_digit() {
                    j += 1;
                }
                let idx: String = chars[start..j].iter().collect();
                let d = idx
                    .parse::<usize>()
                    .with_context(|| format!("bad variable `x{idx}` in `{s}`"))?;
                out.push(Tok::Var(d));
                i = j;
            }
            d if d.is_ascii_digit() => {
                let mut j = i;
                while j < chars.len() && (chars[j].is_ascii_digit() || chars[j] == '/') {
                    j += 1;
                }
                let lit: String = chars[i..j].iter().collect();
                let q = lit
                    .parse::<BigRational>()
                    .map_err(|e| anyhow!("bad number `{lit}`: {e}"))?;
                out.push(Tok::Num(q));
                i = j;
            }
            other => bail!("unexpected character `{other}`"),
        }
    }
    Ok(out)
}

/// Affine form `Σ q_d x_d + cst` with merged dimensions.
#[derive(Clone, Debug, Default, PartialEq)]
struct Affine {
    terms: BTreeMap<usize, BigRational>,
    cst: BigRational,
}

impl Affine {
    fn sub(mut self, other: Affine) -> Affine {
        for (d, q) in other.terms {
            *self.terms.entry(d).or_insert_with(BigRational::zero) -= q;
        }
        self.cst -= other.cst;
        self
    }

    fn into_expr(self) -> LinExpr {
        let mut e = LinExpr::constant(self.cst);
        for (d, q) in self.terms {
            if !q.is_zero() {
                e = e.with(d, Coeff::Scalar(q));
            }
        }
        e
    }
}

fn parse_affine(s: &str) -> Result<Affine> {
    let toks = tokenize(s)?;
    if toks.is_empty() {
        bail!("empty expression");
    }
    let mut out = Affine::default();
    let mut it = toks.into_iter().peekable();
    loop {
        let mut sign = BigRational::one();
        while let Some(t @ (Tok::Plus | Tok::Minus)) = it.peek().cloned() {
            if t == Tok::Minus {
                sign = -sign;
            }
            it.next();
        }
        match it.next() {
            Some(Tok::Num(q)) => {
                if it.peek() == Some(&Tok::Star) {
                    it.next();
                }
                match it.peek().cloned() {
                    Some(Tok::Var(d)) => {
                        it.next();
                        *out.terms.entry(d).or_insert_with(BigRational::zero) += sign * q;
                    }
                    _ => out.cst += sign * q,
                }
            }
            Some(Tok::Var(d)) => {
                *out.terms.entry(d).or_insert_with(BigRational::zero) += sign;
            }
            Some(t) => bail!("unexpected `{t:?}` in `{s}`"),
            None => bail!("dangling sign in `{s}`"),
        }
        match it.peek() {
            None => return Ok(out),
            Some(Tok::Plus | Tok::Minus) => {}
            Some(t) => bail!("expected `+` or `-`, found `{t:?}` in `{s}`"),
        }
    }
}

const RELATIONS: [&str; 7] = [">=", "<=", "==", "!=", "=", ">", "<"];

/// Parse one constraint `lhs ⋈ rhs` into `expr ⋈ 0` form.
pub fn parse_constraint(s: &str) -> Result<LinCons> {
    let (pos, rel) = (0..s.len())
        .filter(|&i| s.is_char_boundary(i))
        .find_map(|i| RELATIONS.iter().find(|r| s[i..].starts_with(**r)).map(|r| (i, *r)))
        .ok_or_else(|| anyhow!("no relation in `{s}`"))?;
    let lhs = parse_affine(&s[..pos]).with_context(|| format!("left side of `{s}`"))?;
    let rhs = parse_affine(&s[pos + rel.len()..]).with_context(|| format!("right side of `{s}`"))?;
    let (kind, e) = match rel {
        ">=" => (ConsKind::SupEq, lhs.sub(rhs)),
        "<=" => (ConsKind::SupEq, rhs.sub(lhs)),
        ">" => (ConsKind::Sup, lhs.sub(rhs)),
        "<" => (ConsKind::Sup, rhs.sub(lhs)),
        "!=" => (ConsKind::Diseq, lhs.sub(rhs)),
        _ => (ConsKind::Eq, lhs.sub(rhs)),
    };
    Ok(LinCons::new(kind, e.into_expr()))
}

/// Parse a `;`-separated system. Blank items are skipped.
pub fn parse_system(s: &str) -> Result<Vec<LinCons>> {
    s.split(';')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(parse_constraint)
        .collect()
}

/// Parse an expression such as `x0 + 2x1 - 3`.
pub fn parse_expr(s: &str) -> Result<LinExpr> {
    Ok(parse_affine(s)?.into_expr())
}

/// One past the largest dimension mentioned.
pub fn dims_used<'a>(exprs: impl IntoIterator<Item = &'a LinExpr>) -> usize {
    exprs
        .into_iter()
        .filter_map(LinExpr::max_dim)
        .map(|d| d + 1)
        .max()
        .unwrap_or(0)
}
