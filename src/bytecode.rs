use crate::value::Value;

/// Maximum number of constants one chunk can address with a byte operand.
pub const MAX_CONSTANTS: usize = 256;

/// Instructions executed by the virtual machine.
///
/// Operand layout: constant, global, local, upvalue, and call operands are
/// one byte; jump and loop offsets are two bytes, big-endian. `OpClosure`
/// takes a constant index followed by one `(is_local, index)` byte pair per
/// captured variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    /// Pushes a constant from the chunk's constant pool.
    OpConstant,
    OpNull,
    OpTrue,
    OpFalse,
    /// Discards the top of the stack.
    OpPop,
    /// Pops a value into a new global named by a string constant.
    OpDefineGlobal,
    /// Pushes a global; reading an undefined global is a runtime error.
    OpGetGlobal,
    /// Assigns an existing global, leaving the value on the stack.
    OpSetGlobal,
    OpGetUpvalue,
    OpSetUpvalue,
    /// Pushes the local at a slot relative to the frame base.
    OpGetLocal,
    OpSetLocal,
    OpEqual,
    OpNotEqual,
    OpGreater,
    OpGreaterEqual,
    OpLess,
    OpLessEqual,
    OpAdd,
    OpSubtract,
    OpMultiply,
    OpDivide,
    OpNot,
    OpNegate,
    /// Calls the value below its arguments with the given argument count.
    OpCall,
    /// Wraps a function constant into a closure, capturing upvalues.
    OpClosure,
    /// Closes the upvalue for the top slot, then pops it.
    OpCloseUpvalue,
    /// Unconditional forward jump.
    OpJump,
    /// Forward jump when the top of the stack is falsey. Does not pop.
    OpJumpIfFalse,
    /// Unconditional backward jump.
    OpLoop,
    /// Returns the top of the stack from the current frame.
    OpReturn,
}

impl OpCode {
    const ALL: [OpCode; 31] = [
        OpCode::OpConstant,
        OpCode::OpNull,
        OpCode::OpTrue,
        OpCode::OpFalse,
        OpCode::OpPop,
        OpCode::OpDefineGlobal,
        OpCode::OpGetGlobal,
        OpCode::OpSetGlobal,
        OpCode::OpGetUpvalue,
        OpCode::OpSetUpvalue,
        OpCode::OpGetLocal,
        OpCode::OpSetLocal,
        OpCode::OpEqual,
        OpCode::OpNotEqual,
        OpCode::OpGreater,
        OpCode::OpGreaterEqual,
        OpCode::OpLess,
        OpCode::OpLessEqual,
        OpCode::OpAdd,
        OpCode::OpSubtract,
        OpCode::OpMultiply,
        OpCode::OpDivide,
        OpCode::OpNot,
        OpCode::OpNegate,
        OpCode::OpCall,
        OpCode::OpClosure,
        OpCode::OpCloseUpvalue,
        OpCode::OpJump,
        OpCode::OpJumpIfFalse,
        OpCode::OpLoop,
        OpCode::OpReturn,
    ];
}

impl TryFrom<u8> for OpCode {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        OpCode::ALL.get(byte as usize).copied().ok_or(byte)
    }
}

impl From<OpCode> for u8 {
    fn from(op: OpCode) -> Self {
        op as u8
    }
}

/// A chunk of bytecode with its constant pool and a source line per byte.
#[derive(Clone, Debug, Default)]
pub struct Chunk {
    pub code: Vec<u8>,
    pub constants: Vec<Value>,
    pub lines: Vec<usize>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, byte: u8, line: usize) {
        self.code.push(byte);
        self.lines.push(line);
    }

    pub fn write_op(&mut self, op: OpCode, line: usize) {
        self.write(op.into(), line);
    }

    /// Appends a constant and returns its index. Identical values are not
    /// deduplicated.
    pub fn add_constant(&mut self, value: Value) -> usize {
        self.constants.push(value);
        self.constants.len() - 1
    }

    /// Source line of the byte at `offset`, or 0 when out of range.
    pub fn line_at(&self, offset: usize) -> usize {
        self.lines.get(offset).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}
