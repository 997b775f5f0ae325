//! Random-access machine: registers plus indirectly addressed memory.
//!
//! Memory is a sparse map from address to value; absent addresses read as
//! zero and zero writes remove the entry. Besides register-addressed
//! `load`/`store`, a memory cursor walks the non-negative addresses like a
//! tape head and supports compound cell operations.

use std::collections::BTreeMap;
use std::fmt;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use super::head::{Motion, Shift};
use crate::device::DeviceKind;
use crate::error::DeviceError;
use crate::numeral::Numeral;
use crate::terminator::{Initialiser, Terminator};
use crate::text::Tokens;

/// Largest shift distance, in bits.
pub const MAX_SHIFT: u32 = 1 << 16;

/// Most registers a RAM device may declare.
pub const MAX_REGISTERS: usize = 1 << 16;

/// Register index.
pub type Register = usize;

/// RAM device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    numeral: Numeral,
    initialiser: Initialiser,
    terminator: Terminator,
    registers: Vec<BigInt>,
    memory: BTreeMap<BigInt, BigInt>,
    head: usize,
}

impl Ram {
    /// Create a RAM with `registers` registers. Register 0 is the
    /// accumulator: it receives the input and provides the output.
    ///
    /// # Errors
    ///
    /// Needs between one and [`MAX_REGISTERS`] registers; only the `Always`
    /// and `Home` terminators are supported.
    pub fn new(
        registers: usize,
        numeral: Numeral,
        initialiser: Initialiser,
        terminator: Terminator,
    ) -> Result<Self, DeviceError> {
        if registers == 0 {
            return Err(DeviceError::NoRegisters);
        }
        if registers > MAX_REGISTERS {
            return Err(DeviceError::TooManyRegisters {
                count: registers,
                max: MAX_REGISTERS,
            });
        }
        if !matches!(terminator, Terminator::Always | Terminator::Home) {
            return Err(DeviceError::UnsupportedTerminator {
                kind: DeviceKind::Ram,
                terminator: terminator.name(),
            });
        }
        Ok(Self {
            numeral,
            initialiser,
            terminator,
            registers: vec![BigInt::zero(); registers],
            memory: BTreeMap::new(),
            head: 0,
        })
    }

    /// Register values.
    #[must_use]
    pub fn registers(&self) -> &[BigInt] {
        &self.registers
    }

    /// Value stored at `address`.
    #[must_use]
    pub fn memory(&self, address: &BigInt) -> BigInt {
        self.memory.get(address).cloned().unwrap_or_default()
    }

    /// Memory cursor position.
    #[must_use]
    pub fn head(&self) -> usize {
        self.head
    }

    /// Numeral encoding used for input and output.
    #[must_use]
    pub fn numeral(&self) -> &Numeral {
        &self.numeral
    }

    fn cell(&self) -> BigInt {
        self.memory(&BigInt::from(self.head))
    }

    fn store(&mut self, address: BigInt, value: BigInt) {
        if value.is_zero() {
            self.memory.remove(&address);
        } else {
            self.memory.insert(address, value);
        }
    }

    fn check_register(&self, register: Register) -> Result<(), DeviceError> {
        if register < self.registers.len() {
            Ok(())
        } else {
            Err(DeviceError::RegisterOutOfRange {
                register,
                count: self.registers.len(),
            })
        }
    }

    pub(crate) fn initialise(&mut self, input: &str) -> Result<(), DeviceError> {
        let accumulator = match self.initialiser {
            Initialiser::Blank => BigInt::zero(),
            Initialiser::Input => self.numeral.parse_signed(input)?,
        };
        self.registers.fill(BigInt::zero());
        self.registers[0] = accumulator;
        self.memory.clear();
        self.head = 0;
        Ok(())
    }

    pub(crate) fn initialiser(&self) -> Initialiser {
        self.initialiser
    }

    pub(crate) fn terminating(&self) -> bool {
        match self.terminator {
            Terminator::Always => true,
            Terminator::Home => self.head == 0,
            _ => false,
        }
    }

    pub(crate) fn terminate(&self) -> String {
        self.numeral.render_signed(&self.registers[0])
    }

    pub(crate) fn terminator(&self) -> Terminator {
        self.terminator.clone()
    }
}

impl fmt::Display for Ram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.registers.iter().enumerate() {
            write!(f, "r{i}={value} ")?;
        }
        write!(f, "@{}", self.head)
    }
}

/// Sign condition on a register or memory cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Equal to zero.
    Zero,
    /// Above zero.
    Positive,
    /// Below zero.
    Negative,
}

impl Sign {
    fn of(value: &BigInt) -> Self {
        if value.is_zero() {
            Self::Zero
        } else if value.is_positive() {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Zero => "zero",
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    fn parse(tokens: &mut Tokens<'_>) -> Result<Self, DeviceError> {
        match tokens.expect("a sign")? {
            "zero" => Ok(Self::Zero),
            "positive" => Ok(Self::Positive),
            "negative" => Ok(Self::Negative),
            other => Err(tokens.error(format!("`{other}` is not a sign"))),
        }
    }
}

/// Binary register arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arith {
    /// `lhs + rhs`
    Add,
    /// `lhs - rhs`
    Sub,
    /// `lhs * rhs`
    Mul,
    /// Truncating division; zero when `rhs` is zero.
    Div,
    /// Remainder of truncating division; zero when `rhs` is zero.
    Mod,
    /// `lhs << rhs`, a negative `rhs` shifts right.
    Shl,
    /// `lhs >> rhs`, a negative `rhs` shifts left.
    Shr,
}

const ARITH_KEYWORDS: [(&str, Arith); 7] = [
    ("add", Arith::Add),
    ("sub", Arith::Sub),
    ("mul", Arith::Mul),
    ("div", Arith::Div),
    ("mod", Arith::Mod),
    ("shl", Arith::Shl),
    ("shr", Arith::Shr),
];

impl Arith {
    fn keyword(self) -> &'static str {
        ARITH_KEYWORDS
            .iter()
            .find(|(_, op)| *op == self)
            .map_or("add", |(keyword, _)| *keyword)
    }

    fn from_keyword(word: &str) -> Option<Self> {
        ARITH_KEYWORDS
            .iter()
            .find(|(keyword, _)| *keyword == word)
            .map(|(_, op)| *op)
    }

    /// Evaluate. Total over all inputs.
    #[must_use]
    pub fn eval(self, lhs: &BigInt, rhs: &BigInt) -> BigInt {
        match self {
            Self::Add => lhs + rhs,
            Self::Sub => lhs - rhs,
            Self::Mul => lhs * rhs,
            Self::Div if rhs.is_zero() => BigInt::zero(),
            Self::Div => lhs / rhs,
            Self::Mod if rhs.is_zero() => BigInt::zero(),
            Self::Mod => lhs % rhs,
            Self::Shl => shift(lhs, rhs),
            Self::Shr => shift(lhs, &-rhs),
        }
    }
}

fn shift(value: &BigInt, amount: &BigInt) -> BigInt {
    let max = BigInt::from(MAX_SHIFT);
    let amount = amount.clone().clamp(-max.clone(), max).to_i64().unwrap_or_default();
    let distance = amount.unsigned_abs() as usize;
    if amount >= 0 {
        value << distance
    } else {
        value >> distance
    }
}

/// Compound memory-cursor operation. The default value stays put.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RamCell {
    /// Require the cursor on address 0.
    pub home: bool,
    /// Require the sign of the cell under the cursor.
    pub look: Option<Sign>,
    /// Copy this register into the cell under the cursor.
    pub write: Option<Register>,
    /// Move the cursor afterwards.
    pub shift: Shift,
}

impl RamCell {
    fn motion(&self) -> Motion {
        Motion {
            home: self.home,
            shift: self.shift,
        }
    }
}

/// RAM operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RamOp {
    /// Leave everything alone.
    Noop,
    /// Load a constant.
    Set {
        /// Destination register.
        dst: Register,
        /// Constant.
        value: BigInt,
    },
    /// `dst = lhs <op> rhs`.
    Arith {
        /// Operator.
        op: Arith,
        /// Destination register.
        dst: Register,
        /// Left operand.
        lhs: Register,
        /// Right operand.
        rhs: Register,
    },
    /// Require a register sign.
    Test {
        /// Tested register.
        reg: Register,
        /// Required sign.
        sign: Sign,
    },
    /// `dst = memory[addr]`, the address read from a register.
    Load {
        /// Destination register.
        dst: Register,
        /// Register holding the address.
        addr: Register,
    },
    /// `memory[addr] = src`, the address read from a register.
    Store {
        /// Source register.
        src: Register,
        /// Register holding the address.
        addr: Register,
    },
    /// Compound cursor operation.
    Cell(RamCell),
}

impl RamOp {
    fn registers(&self) -> Vec<Register> {
        match self {
            Self::Noop => Vec::new(),
            Self::Set { dst, .. } => vec![*dst],
            Self::Arith { dst, lhs, rhs, .. } => vec![*dst, *lhs, *rhs],
            Self::Test { reg, .. } => vec![*reg],
            Self::Load { dst, addr } => vec![*dst, *addr],
            Self::Store { src, addr } => vec![*src, *addr],
            Self::Cell(cell) => cell.write.into_iter().collect(),
        }
    }

    pub(crate) fn applicable(&self, ram: &Ram) -> bool {
        match self {
            Self::Test { reg, sign } => Sign::of(&ram.registers[*reg]) == *sign,
            Self::Cell(cell) => {
                cell.motion().allows(ram.head)
                    && cell.look.map_or(true, |sign| Sign::of(&ram.cell()) == sign)
            }
            _ => true,
        }
    }

    pub(crate) fn apply(&self, ram: &mut Ram) {
        match self {
            Self::Noop | Self::Test { .. } => {}
            Self::Set { dst, value } => ram.registers[*dst] = value.clone(),
            Self::Arith { op, dst, lhs, rhs } => {
                ram.registers[*dst] = op.eval(&ram.registers[*lhs], &ram.registers[*rhs]);
            }
            Self::Load { dst, addr } => {
                ram.registers[*dst] = ram.memory(&ram.registers[*addr]);
            }
            Self::Store { src, addr } => {
                let address = ram.registers[*addr].clone();
                let value = ram.registers[*src].clone();
                ram.store(address, value);
            }
            Self::Cell(cell) => {
                if let Some(src) = cell.write {
                    let value = ram.registers[src].clone();
                    ram.store(BigInt::from(ram.head), value);
                }
                cell.shift.apply(&mut ram.head);
            }
        }
    }

    pub(crate) fn intersects(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Test { reg: r1, sign: s1 }, Self::Test { reg: r2, sign: s2 }) => {
                r1 != r2 || s1 == s2
            }
            (Self::Cell(a), Self::Cell(b)) => {
                let looks = match (a.look, b.look) {
                    (Some(x), Some(y)) => x == y,
                    _ => true,
                };
                looks && a.motion().meets(b.motion())
            }
            (Self::Cell(cell), _) | (_, Self::Cell(cell)) => cell.motion().satisfiable(),
            _ => true,
        }
    }

    pub(crate) fn intersects_terminator(&self, terminator: &Terminator) -> bool {
        match (terminator, self) {
            (Terminator::Always, Self::Cell(cell)) => cell.motion().satisfiable(),
            (Terminator::Home, Self::Cell(cell)) => cell.motion().reaches_home(),
            (Terminator::Always | Terminator::Home, _) => true,
            _ => false,
        }
    }

    pub(crate) fn check(&self, ram: &Ram) -> Result<(), DeviceError> {
        self.registers()
            .into_iter()
            .try_for_each(|register| ram.check_register(register))
    }

    pub(crate) fn parse(text: &str) -> Result<Self, DeviceError> {
        let mut tokens = Tokens::new(DeviceKind::Ram, text);
        let word = tokens.expect("a ram operation")?;
        let op = match word {
            "noop" => Self::Noop,
            "set" => Self::Set {
                dst: tokens.register()?,
                value: tokens.number("an integer")?,
            },
            "test" => Self::Test {
                reg: tokens.register()?,
                sign: Sign::parse(&mut tokens)?,
            },
            "load" => Self::Load {
                dst: tokens.register()?,
                addr: tokens.register()?,
            },
            "store" => Self::Store {
                src: tokens.register()?,
                addr: tokens.register()?,
            },
            word => match Arith::from_keyword(word) {
                Some(op) => Self::Arith {
                    op,
                    dst: tokens.register()?,
                    lhs: tokens.register()?,
                    rhs: tokens.register()?,
                },
                None => return Self::parse_cell(word, tokens).map(Self::Cell),
            },
        };
        tokens.finish()?;
        Ok(op)
    }

    fn parse_cell(first: &str, mut tokens: Tokens<'_>) -> Result<RamCell, DeviceError> {
        let mut cell = RamCell::default();
        let mut moved = false;
        let mut word = Some(first);
        while let Some(current) = word {
            match current {
                "home" if !cell.home => cell.home = true,
                "look" if cell.look.is_none() => cell.look = Some(Sign::parse(&mut tokens)?),
                "write" if cell.write.is_none() => cell.write = Some(tokens.register()?),
                current => match Shift::from_keyword(current) {
                    Some(shift) if !moved => {
                        cell.shift = shift;
                        moved = true;
                    }
                    _ => return Err(tokens.error(format!("unexpected `{current}`"))),
                },
            }
            word = tokens.next_word();
        }
        Ok(cell)
    }
}

impl fmt::Display for RamOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Noop => f.write_str("noop"),
            Self::Set { dst, value } => write!(f, "set r{dst} {value}"),
            Self::Arith { op, dst, lhs, rhs } => {
                write!(f, "{} r{dst} r{lhs} r{rhs}", op.keyword())
            }
            Self::Test { reg, sign } => write!(f, "test r{reg} {}", sign.keyword()),
            Self::Load { dst, addr } => write!(f, "load r{dst} r{addr}"),
            Self::Store { src, addr } => write!(f, "store r{src} r{addr}"),
            Self::Cell(cell) => {
                let mut parts = Vec::new();
                if cell.home {
                    parts.push("home".to_string());
                }
                if let Some(sign) = cell.look {
                    parts.push(format!("look {}", sign.keyword()));
                }
                if let Some(src) = cell.write {
                    parts.push(format!("write r{src}"));
                }
                if cell.shift != Shift::Stay || parts.is_empty() {
                    parts.push(cell.shift.to_string());
                }
                f.write_str(&parts.join(" "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ram(input: &str) -> Ram {
        let mut ram = Ram::new(3, Numeral::decimal(), Initialiser::Input, Terminator::Home).unwrap();
        ram.initialise(input).unwrap();
        ram
    }

    fn op(text: &str) -> RamOp {
        RamOp::parse(text).unwrap()
    }

    #[test]
    fn test_arithmetic_is_total() {
        let zero = BigInt::zero();
        let seven = BigInt::from(7);
        assert_eq!(Arith::Div.eval(&seven, &zero), zero);
        assert_eq!(Arith::Mod.eval(&seven, &zero), zero);
        assert_eq!(Arith::Shl.eval(&seven, &BigInt::from(2)), BigInt::from(28));
        assert_eq!(Arith::Shl.eval(&seven, &BigInt::from(-1)), BigInt::from(3));
        assert_eq!(Arith::Shr.eval(&seven, &BigInt::from(-1)), BigInt::from(14));
        let huge = Arith::Shl.eval(&BigInt::from(1), &BigInt::from(1u64 << 40));
        assert_eq!(huge.bits(), u64::from(MAX_SHIFT) + 1);
    }

    #[test]
    fn test_load_store_through_registers() {
        let mut device = ram("12");
        op("set r1 -4").apply(&mut device);
        op("store r0 r1").apply(&mut device);
        assert_eq!(device.memory(&BigInt::from(-4)), BigInt::from(12));
        op("load r2 r1").apply(&mut device);
        assert_eq!(device.registers()[2], BigInt::from(12));
        op("sub r0 r0 r2").apply(&mut device);
        op("store r0 r1").apply(&mut device);
        assert!(device.memory.is_empty());
        assert_eq!(device.terminate(), "0");
    }

    #[test]
    fn test_cell_cursor_walks_memory() {
        let mut device = ram("5");
        let write = op("home look zero write r0 right");
        assert!(write.applicable(&device));
        write.apply(&mut device);
        assert_eq!(device.head(), 1);
        assert!(!device.terminating());
        assert!(!write.applicable(&device));
        let back = op("left");
        back.apply(&mut device);
        assert!(op("look positive").applicable(&device));
        assert!(!back.applicable(&device));
    }

    #[test]
    fn test_conflict_table() {
        assert!(!op("test r0 zero").intersects(&op("test r0 negative")));
        assert!(op("test r0 zero").intersects(&op("test r1 negative")));
        assert!(op("add r0 r0 r1").intersects(&op("test r0 zero")));
        assert!(!op("home").intersects(&op("left")));
        assert!(!op("look zero").intersects(&op("look positive")));
        assert!(op("look zero").intersects(&op("store r0 r1")));
        assert!(!op("left").intersects_terminator(&Terminator::Home));
    }

    #[test]
    fn test_registers_are_checked() {
        let device = ram("");
        assert!(op("add r0 r1 r2").check(&device).is_ok());
        assert_eq!(
            op("load r3 r0").check(&device),
            Err(DeviceError::RegisterOutOfRange {
                register: 3,
                count: 3
            })
        );
        assert!(RamOp::parse("add r0 r1").is_err());
        assert!(RamOp::parse("jump").is_err());
    }

    #[test]
    fn test_register_count_is_bounded() {
        let new = |registers| {
            Ram::new(
                registers,
                Numeral::decimal(),
                Initialiser::Input,
                Terminator::Home,
            )
        };
        assert_eq!(new(0), Err(DeviceError::NoRegisters));
        assert!(new(MAX_REGISTERS).is_ok());
        assert_eq!(
            new(usize::MAX),
            Err(DeviceError::TooManyRegisters {
                count: usize::MAX,
                max: MAX_REGISTERS
            })
        );
    }
}
