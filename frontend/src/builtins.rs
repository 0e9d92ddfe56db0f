//! The builtin registry: every runtime word the interpreter knows, with
//! its declared stack effect, plus the closed set of compile-time words.
//!
//! Fused builtins are registered under space-prefixed names. Tokens are
//! whitespace-delimited, so no source text can ever resolve them; only
//! the peephole optimizer emits them.

/// Declared stack effect of a runtime builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackEffect {
    pub d_pops: u8,
    pub d_pushes: u8,
    pub r_pops: u8,
    pub r_pushes: u8,
}

const fn d(pops: u8, pushes: u8) -> StackEffect {
    StackEffect {
        d_pops: pops,
        d_pushes: pushes,
        r_pops: 0,
        r_pushes: 0,
    }
}

const fn dr(d_pops: u8, d_pushes: u8, r_pops: u8, r_pushes: u8) -> StackEffect {
    StackEffect {
        d_pops,
        d_pushes,
        r_pops,
        r_pushes,
    }
}

/// A runtime builtin word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    // Per-invocation inputs.
    X,
    Y,
    T,
    Dt,
    // Input stubs, kept for language compatibility.
    Mx,
    My,
    Button,
    Buttons,
    Audio,
    Sample,
    BwSample,
    // Return stack.
    ToR,
    FromR,
    RFetch,
    // Memory.
    Load,
    Store,
    // Stack manipulation.
    Dup,
    Over,
    TwoDup,
    ZAdd,
    ZMul,
    Drop,
    Swap,
    Rot,
    Unrot,
    // Comparison. Operands are taken top-first: `a b <` tests b < a.
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    // Arithmetic.
    Add,
    Mul,
    Sub,
    Div,
    Mod,
    Pow,
    Atan2,
    Negate,
    Min,
    Max,
    Abs,
    Sqrt,
    Log,
    Exp,
    Sin,
    Cos,
    Tan,
    Floor,
    Ceil,
    // Logic.
    And,
    Or,
    Not,
    // Sources.
    Pi,
    Random,
    // Fused builtins, emitted only by the peephole optimizer.
    Fma,
    MultPi,
    MultHalfPi,
    Mult2,
    Pow2,
    Div2,
    DupDup,
    UnrotSwap,
    GeSwap,
}

impl Builtin {
    /// Canonical name. Fused builtins carry the space prefix.
    pub fn name(self) -> &'static str {
        use Builtin::*;
        match self {
            X => "x",
            Y => "y",
            T => "t",
            Dt => "dt",
            Mx => "mx",
            My => "my",
            Button => "button",
            Buttons => "buttons",
            Audio => "audio",
            Sample => "sample",
            BwSample => "bwsample",
            ToR => ">r",
            FromR => "r>",
            RFetch => "r@",
            Load => "@",
            Store => "!",
            Dup => "dup",
            Over => "over",
            TwoDup => "2dup",
            ZAdd => "z+",
            ZMul => "z*",
            Drop => "drop",
            Swap => "swap",
            Rot => "rot",
            Unrot => "-rot",
            Eq => "=",
            Ne => "<>",
            Gt => ">",
            Lt => "<",
            Ge => ">=",
            Le => "<=",
            Add => "+",
            Mul => "*",
            Sub => "-",
            Div => "/",
            Mod => "mod",
            Pow => "pow",
            Atan2 => "atan2",
            Negate => "negate",
            Min => "min",
            Max => "max",
            Abs => "abs",
            Sqrt => "sqrt",
            Log => "log",
            Exp => "exp",
            Sin => "sin",
            Cos => "cos",
            Tan => "tan",
            Floor => "floor",
            Ceil => "ceil",
            And => "and",
            Or => "or",
            Not => "not",
            Pi => "pi",
            Random => "random",
            Fma => " fma",
            MultPi => " multpi",
            MultHalfPi => " multhalfpi",
            Mult2 => " mult2",
            Pow2 => " pow2",
            Div2 => " div2",
            DupDup => " dupdup",
            UnrotSwap => " -rotswap",
            GeSwap => " >=swap",
        }
    }

    /// Declared D/R stack effect, used by the static checker.
    pub fn effect(self) -> StackEffect {
        use Builtin::*;
        match self {
            X | Y | T | Dt | Mx | My | Buttons | Pi | Random => d(0, 1),
            Button => d(1, 1),
            Audio => d(1, 0),
            Sample => d(2, 3),
            BwSample => d(2, 1),
            ToR => dr(1, 0, 0, 1),
            FromR => dr(0, 1, 1, 0),
            RFetch => dr(0, 1, 1, 1),
            Load => d(1, 1),
            Store => d(2, 0),
            Dup => d(1, 2),
            Over => d(2, 3),
            TwoDup => d(2, 4),
            ZAdd | ZMul => d(4, 2),
            Drop => d(1, 0),
            Swap => d(2, 2),
            Rot | Unrot | UnrotSwap => d(3, 3),
            Eq | Ne | Gt | Lt | Ge | Le => d(2, 1),
            Add | Mul | Sub | Div | Mod | Pow | Atan2 | Min | Max | And | Or => d(2, 1),
            Negate | Abs | Sqrt | Log | Exp | Sin | Cos | Tan | Floor | Ceil | Not => d(1, 1),
            Fma => d(3, 1),
            MultPi | MultHalfPi | Mult2 | Pow2 | Div2 => d(1, 1),
            DupDup => d(1, 4),
            GeSwap => d(3, 2),
        }
    }

    /// Fused builtins are unreachable from source text.
    pub fn is_private(self) -> bool {
        self.name().starts_with(' ')
    }
}

/// Every name the compiler registers, including alias spellings.
pub const REGISTRY: &[(&str, Builtin)] = &[
    ("x", Builtin::X),
    ("y", Builtin::Y),
    ("t", Builtin::T),
    ("dt", Builtin::Dt),
    ("mx", Builtin::Mx),
    ("my", Builtin::My),
    ("button", Builtin::Button),
    ("buttons", Builtin::Buttons),
    ("audio", Builtin::Audio),
    ("sample", Builtin::Sample),
    ("bwsample", Builtin::BwSample),
    ("push", Builtin::ToR),
    (">r", Builtin::ToR),
    ("pop", Builtin::FromR),
    ("r>", Builtin::FromR),
    ("r@", Builtin::RFetch),
    ("@", Builtin::Load),
    ("!", Builtin::Store),
    ("dup", Builtin::Dup),
    ("over", Builtin::Over),
    ("2dup", Builtin::TwoDup),
    ("z+", Builtin::ZAdd),
    ("z*", Builtin::ZMul),
    ("drop", Builtin::Drop),
    ("swap", Builtin::Swap),
    ("rot", Builtin::Rot),
    ("-rot", Builtin::Unrot),
    ("=", Builtin::Eq),
    ("<>", Builtin::Ne),
    (">", Builtin::Gt),
    ("<", Builtin::Lt),
    (">=", Builtin::Ge),
    ("<=", Builtin::Le),
    ("+", Builtin::Add),
    ("*", Builtin::Mul),
    ("-", Builtin::Sub),
    ("/", Builtin::Div),
    ("mod", Builtin::Mod),
    ("pow", Builtin::Pow),
    ("**", Builtin::Pow),
    ("atan2", Builtin::Atan2),
    ("negate", Builtin::Negate),
    ("min", Builtin::Min),
    ("max", Builtin::Max),
    ("abs", Builtin::Abs),
    ("sqrt", Builtin::Sqrt),
    ("log", Builtin::Log),
    ("exp", Builtin::Exp),
    ("sin", Builtin::Sin),
    ("cos", Builtin::Cos),
    ("tan", Builtin::Tan),
    ("floor", Builtin::Floor),
    ("ceil", Builtin::Ceil),
    ("and", Builtin::And),
    ("or", Builtin::Or),
    ("not", Builtin::Not),
    ("pi", Builtin::Pi),
    ("random", Builtin::Random),
    (" fma", Builtin::Fma),
    (" multpi", Builtin::MultPi),
    (" multhalfpi", Builtin::MultHalfPi),
    (" mult2", Builtin::Mult2),
    (" pow2", Builtin::Pow2),
    (" div2", Builtin::Div2),
    (" dupdup", Builtin::DupDup),
    (" -rotswap", Builtin::UnrotSwap),
    (" >=swap", Builtin::GeSwap),
];

/// A compile-time word: runs during parsing and mutates compiler state
/// or the input position instead of emitting its own call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWord {
    /// `\` - discard input through the next newline.
    Backslash,
    /// `(` - discard input through the next `)`.
    Paren,
    /// `:` - open a user-word definition.
    Colon,
    /// `;` - close the current definition.
    Semicolon,
    If,
    Else,
    Then,
}

pub const CONTROL_WORDS: &[(&str, ControlWord)] = &[
    ("\\", ControlWord::Backslash),
    ("(", ControlWord::Paren),
    (":", ControlWord::Colon),
    (";", ControlWord::Semicolon),
    ("if", ControlWord::If),
    ("else", ControlWord::Else),
    ("then", ControlWord::Then),
];
