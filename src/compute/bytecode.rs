use crate::store::{Expr, Node, NodeBody, NodeId, Operation};
use smallvec::SmallVec;
use std::collections::HashMap;

/// One postfix instruction. Operands are popped from the evaluation stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OpCode {
    Literal(f64),
    /// Push the current value of a node slot.
    Load(u32),
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Min,
    Max,
}

/// How one Level moves: `next = current + Σ inflows − Σ outflows`.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelUpdate {
    pub level: NodeId,
    pub inflows: SmallVec<[NodeId; 4]>,
    pub outflows: SmallVec<[NodeId; 4]>,
}

/// The linear execution tape of a frozen model.
///
/// All formulas are concatenated into `ops`; `ranges[i]` is the
/// `(start, count)` slice of node `i` (empty for Constants and Levels).
/// `order` lists formula nodes in evaluation order: Auxiliaries in
/// topological order, then Rates in id order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub ops: Vec<OpCode>,
    pub ranges: Vec<(u32, u32)>,
    pub order: Vec<NodeId>,
    /// Parallel to the model's Level column order.
    pub levels: Vec<LevelUpdate>,
}

impl Program {
    #[inline(always)]
    pub fn tape(&self, id: NodeId) -> &[OpCode] {
        let (start, count) = self.ranges[id.index()];
        &self.ops[start as usize..(start + count) as usize]
    }
}

pub struct Compiler<'a> {
    nodes: &'a [Node],
    index: &'a HashMap<String, NodeId>,
}

impl<'a> Compiler<'a> {
    pub fn new(nodes: &'a [Node], index: &'a HashMap<String, NodeId>) -> Self {
        Self { nodes, index }
    }

    /// Lowers every formula to postfix and resolves flow lists to slots.
    ///
    /// References must already resolve; the validator guarantees it.
    pub fn compile(&self, auxiliaries: &[NodeId], rates: &[NodeId], levels: &[NodeId]) -> Program {
        let mut ops = Vec::new();
        let mut ranges = vec![(0u32, 0u32); self.nodes.len()];

        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(formula) = node.formula() {
                let start = ops.len() as u32;
                self.emit(formula, &mut ops);
                ranges[i] = (start, ops.len() as u32 - start);
            }
        }

        let order = auxiliaries.iter().chain(rates.iter()).copied().collect();
        let levels = levels.iter().map(|&level| self.level_update(level)).collect();

        Program { ops, ranges, order, levels }
    }

    fn emit(&self, expr: &Expr, ops: &mut Vec<OpCode>) {
        match expr {
            Expr::Number(v) => ops.push(OpCode::Literal(*v)),
            Expr::Coefficient { value, .. } => ops.push(OpCode::Literal(*value)),
            Expr::Reference(id) => {
                let slot = self.index.get(id).map_or(u32::MAX, |n| n.0);
                ops.push(OpCode::Load(slot));
            }
            Expr::Negate(inner) => {
                self.emit(inner, ops);
                ops.push(OpCode::Neg);
            }
            Expr::Binary { op, lhs, rhs } => {
                self.emit(lhs, ops);
                self.emit(rhs, ops);
                ops.push(match op {
                    Operation::Add => OpCode::Add,
                    Operation::Subtract => OpCode::Sub,
                    Operation::Multiply => OpCode::Mul,
                    Operation::Divide => OpCode::Div,
                    Operation::Min => OpCode::Min,
                    Operation::Max => OpCode::Max,
                });
            }
        }
    }

    fn level_update(&self, level: NodeId) -> LevelUpdate {
        let resolve = |ids: &[String]| -> SmallVec<[NodeId; 4]> {
            let mut out: SmallVec<[NodeId; 4]> = SmallVec::new();
            for id in ids {
                if let Some(&n) = self.index.get(id) {
                    // Flow lists are sets.
                    if !out.contains(&n) {
                        out.push(n);
                    }
                }
            }
            out
        };
        match &self.nodes[level.index()].body {
            NodeBody::Level { inflows, outflows, .. } => LevelUpdate {
                level,
                inflows: resolve(inflows),
                outflows: resolve(outflows),
            },
            _ => LevelUpdate { level, inflows: SmallVec::new(), outflows: SmallVec::new() },
        }
    }
}
