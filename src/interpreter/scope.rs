//! Scope frames and qualified variable names
//!
//! Every variable is stored under a qualified name:
//! - `universal.<name>` for top-level declarations
//! - `<level>.<name>` inside a method activation, `level` being the negative
//!   frame level unique to that activation
//! - plain `<name>` inside the entry routine
//! - `<method>.returnValue` for the last value a method gave
//!
//! [`Scope`] owns the frame stack and the variable table and performs every
//! allocation and release through the [`Ram`].

use super::constants::{ENTRY_METHOD, KEYWORDS, PERMANENT_DEPTH, RETURN_VALUE, UNIVERSAL_PREFIX};
use super::errors::RuntimeError;
use crate::memory::ram::Ram;
use crate::memory::value::{Value, VarType};
use crate::source::SourceLocation;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Method,
    Loop,
    IfElse,
}

/// One entry of the scope-frame stack
#[derive(Debug, Clone)]
pub struct ScopeFrame {
    pub kind: FrameKind,
    /// Cleared once `break` or `give` fired inside the construct
    pub running: bool,
    /// Callee name (METHOD frames only)
    pub method: Option<String>,
    /// Frame level of the activation (METHOD frames only)
    pub level: i64,
}

/// Frames compare by kind only
impl PartialEq for ScopeFrame {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl ScopeFrame {
    fn new(kind: FrameKind) -> Self {
        ScopeFrame {
            kind,
            running: true,
            method: None,
            level: 0,
        }
    }
}

/// Declaration depth and type of a live variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub depth: i64,
    pub var_type: VarType,
}

#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<ScopeFrame>,
    variables: FxHashMap<String, VariableDescriptor>,
    block_depth: i64,
    frame_level: i64,
}

fn mem_err(location: SourceLocation) -> impl Fn(crate::memory::MemoryError) -> RuntimeError {
    move |err| RuntimeError::from_memory(err, location)
}

/// Whether `name` may not be declared as a variable
pub fn is_reserved(name: &str) -> bool {
    KEYWORDS.contains(&name) || VarType::from_keyword(name).is_some()
}

impl Scope {
    pub fn new() -> Self {
        let mut sentinel = ScopeFrame::new(FrameKind::Method);
        sentinel.method = Some(ENTRY_METHOD.to_string());
        sentinel.level = -1;
        Scope {
            frames: vec![sentinel],
            variables: FxHashMap::default(),
            block_depth: 0,
            frame_level: -1,
        }
    }

    pub fn frames(&self) -> &[ScopeFrame] {
        &self.frames
    }

    pub fn variables(&self) -> &FxHashMap<String, VariableDescriptor> {
        &self.variables
    }

    pub fn block_depth(&self) -> i64 {
        self.block_depth
    }

    pub fn frame_level(&self) -> i64 {
        self.frame_level
    }

    // ========== Frames ==========

    /// Pushes a construct frame and returns its index.
    pub fn push_frame(&mut self, kind: FrameKind) -> usize {
        self.frames.push(ScopeFrame::new(kind));
        self.frames.len() - 1
    }

    /// Opens a new method activation and returns its frame index.
    pub fn push_method_frame(&mut self, method: &str) -> usize {
        self.frame_level -= 1;
        let mut frame = ScopeFrame::new(FrameKind::Method);
        frame.method = Some(method.to_string());
        frame.level = self.frame_level;
        self.frames.push(frame);
        self.frames.len() - 1
    }

    /// Level the next method activation will use
    pub fn next_frame_level(&self) -> i64 {
        self.frame_level - 1
    }

    /// Closes a method activation opened by [`Scope::push_method_frame`].
    pub fn pop_method_frame(&mut self, index: usize) -> bool {
        let running = self.pop_to(index);
        self.frame_level += 1;
        running
    }

    /// Drops the frame at `index` and everything above it, returning whether
    /// that frame was still running.
    pub fn pop_to(&mut self, index: usize) -> bool {
        // The sentinel is permanent
        let index = index.max(1);
        let running = self.frames.get(index).map_or(true, |f| f.running);
        self.frames.truncate(index);
        running
    }

    pub fn is_running(&self, index: usize) -> bool {
        self.frames.get(index).is_some_and(|f| f.running)
    }

    /// Whether the innermost frame is still running
    pub fn top_running(&self) -> bool {
        self.frames.last().is_some_and(|f| f.running)
    }

    fn nearest_method_index(&self) -> usize {
        self.frames
            .iter()
            .rposition(|f| f.kind == FrameKind::Method)
            .unwrap_or(0)
    }

    /// The innermost METHOD frame
    pub fn current_method(&self) -> &ScopeFrame {
        &self.frames[self.nearest_method_index()]
    }

    pub fn in_entry_routine(&self) -> bool {
        self.nearest_method_index() == 0
    }

    /// Number of frames a `break` unwinds: everything down to and including
    /// the nearest LOOP above the nearest METHOD.
    pub fn break_span(&self) -> Option<usize> {
        let method = self.nearest_method_index();
        self.frames[method + 1..]
            .iter()
            .rposition(|f| f.kind == FrameKind::Loop)
            .map(|offset| self.frames.len() - (method + 1 + offset))
    }

    /// Clears `running` on the top `count` frames.
    pub fn stop_frames(&mut self, count: usize) {
        let len = self.frames.len();
        for frame in &mut self.frames[len.saturating_sub(count)..] {
            frame.running = false;
        }
    }

    /// Clears `running` from the top down to and including the nearest METHOD.
    pub fn stop_method(&mut self) {
        let method = self.nearest_method_index();
        self.stop_frames(self.frames.len() - method);
    }

    // ========== Names ==========

    /// Qualified name a local declaration of `name` gets in the current frame
    pub fn qualify(&self, name: &str) -> String {
        if self.in_entry_routine() {
            name.to_string()
        } else {
            format!("{}.{}", self.current_method().level, name)
        }
    }

    /// Resolves a bare name, innermost frame first then universals.
    pub fn find(&self, name: &str) -> Option<(String, VariableDescriptor)> {
        if name.contains('.') {
            return self
                .variables
                .get(name)
                .map(|d| (name.to_string(), *d));
        }
        [self.qualify(name), format!("{}.{}", UNIVERSAL_PREFIX, name)]
            .into_iter()
            .find_map(|qualified| self.variables.get(&qualified).map(|d| (qualified, *d)))
    }

    pub fn lookup(
        &self,
        name: &str,
        location: SourceLocation,
    ) -> Result<(String, VariableDescriptor), RuntimeError> {
        self.find(name)
            .ok_or_else(|| RuntimeError::UndeclaredVariable {
                name: name.to_string(),
                location,
            })
    }

    fn check_new(&self, name: &str, qualified: &str, location: SourceLocation) -> Result<(), RuntimeError> {
        if is_reserved(name) {
            return Err(RuntimeError::ReservedName {
                name: name.to_string(),
                location,
            });
        }
        if self.variables.contains_key(qualified) {
            return Err(RuntimeError::DuplicateDeclaration {
                name: name.to_string(),
                location,
            });
        }
        Ok(())
    }

    // ========== Storage ==========

    fn insert(
        &mut self,
        ram: &mut Ram,
        qualified: String,
        depth: i64,
        value: &Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        ram.write(&qualified, value).map_err(mem_err(location))?;
        self.variables.insert(
            qualified,
            VariableDescriptor {
                depth,
                var_type: value.var_type(),
            },
        );
        Ok(())
    }

    /// Declares a local in the current frame and block.
    pub fn declare(
        &mut self,
        ram: &mut Ram,
        name: &str,
        value: &Value,
        location: SourceLocation,
    ) -> Result<String, RuntimeError> {
        let qualified = self.qualify(name);
        self.check_new(name, &qualified, location)?;
        self.insert(ram, qualified.clone(), self.block_depth, value, location)?;
        Ok(qualified)
    }

    pub fn declare_universal(
        &mut self,
        ram: &mut Ram,
        name: &str,
        value: &Value,
        location: SourceLocation,
    ) -> Result<String, RuntimeError> {
        let qualified = format!("{}.{}", UNIVERSAL_PREFIX, name);
        self.check_new(name, &qualified, location)?;
        self.insert(ram, qualified.clone(), PERMANENT_DEPTH, value, location)?;
        Ok(qualified)
    }

    /// Binds a by-value parameter of the activation at `level`.
    pub fn bind_param(
        &mut self,
        ram: &mut Ram,
        level: i64,
        name: &str,
        value: &Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let qualified = format!("{}.{}", level, name);
        self.check_new(name, &qualified, location)?;
        self.insert(ram, qualified, self.block_depth, value, location)
    }

    /// Binds a parameter that shares storage with an existing variable.
    pub fn bind_alias(
        &mut self,
        ram: &mut Ram,
        level: i64,
        name: &str,
        target: &str,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let qualified = format!("{}.{}", level, name);
        self.check_new(name, &qualified, location)?;
        let descriptor = self
            .variables
            .get(target)
            .copied()
            .ok_or_else(|| RuntimeError::UndeclaredVariable {
                name: target.to_string(),
                location,
            })?;
        ram.alias(&qualified, target).map_err(mem_err(location))?;
        self.variables.insert(
            qualified,
            VariableDescriptor {
                depth: self.block_depth,
                var_type: descriptor.var_type,
            },
        );
        Ok(())
    }

    /// Overwrites an existing variable.
    pub fn assign(
        &mut self,
        ram: &mut Ram,
        qualified: &str,
        value: &Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        ram.write(qualified, value).map_err(mem_err(location))
    }

    /// Stores the value a method gave under `<method>.returnValue`.
    pub fn store_return(
        &mut self,
        ram: &mut Ram,
        method: &str,
        value: &Value,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let qualified = format!("{}.{}", method, RETURN_VALUE);
        if self.variables.contains_key(&qualified) {
            self.remove(ram, &qualified, location)?;
        }
        self.insert(ram, qualified, PERMANENT_DEPTH, value, location)
    }

    pub fn read(
        &self,
        ram: &Ram,
        qualified: &str,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        ram.read(qualified).map_err(mem_err(location))
    }

    pub fn remove(
        &mut self,
        ram: &mut Ram,
        qualified: &str,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        self.variables.remove(qualified);
        ram.delete(qualified).map_err(mem_err(location))
    }

    /// Removes a set of variables, most recently allocated first so the
    /// high-water mark can retreat.
    fn remove_all(
        &mut self,
        ram: &mut Ram,
        mut names: Vec<String>,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        names.sort_by_key(|name| std::cmp::Reverse(ram.bucket(name).map_or(0, |b| b.start)));
        for name in names {
            self.remove(ram, &name, location)?;
        }
        Ok(())
    }

    // ========== Blocks ==========

    pub fn enter_block(&mut self) {
        self.block_depth += 1;
    }

    /// Leaves a block, freeing every variable declared at or below its depth
    /// unless `sweep` is false.
    pub fn exit_block(
        &mut self,
        ram: &mut Ram,
        sweep: bool,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        if sweep {
            let depth = self.block_depth;
            let expired: Vec<String> = self
                .variables
                .iter()
                .filter(|(_, d)| d.depth >= depth)
                .map(|(name, _)| name.clone())
                .collect();
            if !expired.is_empty() {
                tracing::trace!(depth, count = expired.len(), "sweeping block");
            }
            self.remove_all(ram, expired, location)?;
        }
        self.block_depth -= 1;
        Ok(())
    }

    /// Frees every variable of the activation at `level`.
    pub fn sweep_frame(
        &mut self,
        ram: &mut Ram,
        level: i64,
        location: SourceLocation,
    ) -> Result<(), RuntimeError> {
        let prefix = format!("{}.", level);
        let expired: Vec<String> = self
            .variables
            .keys()
            .filter(|name| name.starts_with(&prefix))
            .cloned()
            .collect();
        tracing::trace!(level, count = expired.len(), "sweeping frame");
        self.remove_all(ram, expired, location)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc() -> SourceLocation {
        SourceLocation::new(1, 1)
    }

    #[test]
    fn test_entry_routine_names_are_plain() {
        let mut scope = Scope::new();
        let mut ram = Ram::new(1024);
        scope.enter_block();
        let name = scope.declare(&mut ram, "x", &Value::Integer(1), loc()).unwrap();
        assert_eq!(name, "x");
        assert_eq!(scope.lookup("x", loc()).unwrap().0, "x");
    }

    #[test]
    fn test_method_locals_are_prefixed() {
        let mut scope = Scope::new();
        let mut ram = Ram::new(1024);
        scope.declare_universal(&mut ram, "g", &Value::Integer(1), loc()).unwrap();
        scope.push_method_frame("f");
        let name = scope.declare(&mut ram, "x", &Value::Integer(2), loc()).unwrap();
        assert_eq!(name, "-2.x");
        assert_eq!(scope.lookup("g", loc()).unwrap().0, "universal.g");
    }

    #[test]
    fn test_method_cannot_see_entry_locals() {
        let mut scope = Scope::new();
        let mut ram = Ram::new(1024);
        scope.enter_block();
        scope.declare(&mut ram, "x", &Value::Integer(1), loc()).unwrap();
        scope.push_method_frame("f");
        assert!(matches!(
            scope.lookup("x", loc()),
            Err(RuntimeError::UndeclaredVariable { .. })
        ));
    }

    #[test]
    fn test_local_shadows_universal() {
        let mut scope = Scope::new();
        let mut ram = Ram::new(1024);
        scope.declare_universal(&mut ram, "x", &Value::Integer(1), loc()).unwrap();
        scope.enter_block();
        scope.declare(&mut ram, "x", &Value::Integer(2), loc()).unwrap();
        let (name, _) = scope.lookup("x", loc()).unwrap();
        assert_eq!(scope.read(&ram, &name, loc()).unwrap(), Value::Integer(2));
    }

    #[test]
    fn test_duplicate_and_reserved() {
        let mut scope = Scope::new();
        let mut ram = Ram::new(1024);
        scope.declare(&mut ram, "x", &Value::Integer(1), loc()).unwrap();
        assert!(matches!(
            scope.declare(&mut ram, "x", &Value::Integer(2), loc()),
            Err(RuntimeError::DuplicateDeclaration { .. })
        ));
        assert!(matches!(
            scope.declare(&mut ram, "while", &Value::Integer(2), loc()),
            Err(RuntimeError::ReservedName { .. })
        ));
        assert!(matches!(
            scope.declare(&mut ram, "returnValue", &Value::Integer(2), loc()),
            Err(RuntimeError::ReservedName { .. })
        ));
    }

    #[test]
    fn test_block_exit_sweeps_and_retreats() {
        let mut scope = Scope::new();
        let mut ram = Ram::new(1024);
        scope.enter_block();
        scope.declare(&mut ram, "a", &Value::Integer(1), loc()).unwrap();
        scope.enter_block();
        scope.declare(&mut ram, "b", &Value::Integer(2), loc()).unwrap();
        scope.declare(&mut ram, "c", &Value::Boolean(true), loc()).unwrap();
        scope.exit_block(&mut ram, true, loc()).unwrap();
        assert!(scope.find("b").is_none());
        assert!(scope.find("a").is_some());
        assert_eq!(ram.high_water(), 32);
    }

    #[test]
    fn test_break_span_stops_at_method() {
        let mut scope = Scope::new();
        scope.push_frame(FrameKind::Loop);
        scope.push_frame(FrameKind::IfElse);
        assert_eq!(scope.break_span(), Some(2));
        scope.push_method_frame("f");
        assert_eq!(scope.break_span(), None);
        scope.push_frame(FrameKind::Loop);
        assert_eq!(scope.break_span(), Some(1));
    }

    #[test]
    fn test_stop_method_unwinds_to_activation() {
        let mut scope = Scope::new();
        let method = scope.push_method_frame("f");
        let lp = scope.push_frame(FrameKind::Loop);
        scope.stop_method();
        assert!(!scope.is_running(lp));
        assert!(!scope.is_running(method));
        assert!(scope.is_running(0));
        assert!(!scope.pop_method_frame(method));
        assert_eq!(scope.frame_level(), -1);
    }

    #[test]
    fn test_frame_sweep_by_prefix() {
        let mut scope = Scope::new();
        let mut ram = Ram::new(1024);
        scope.enter_block();
        scope.declare(&mut ram, "keep", &Value::Integer(1), loc()).unwrap();
        let level = scope.next_frame_level();
        scope.bind_param(&mut ram, level, "n", &Value::Integer(5), loc()).unwrap();
        scope.push_method_frame("f");
        scope.declare(&mut ram, "tmp", &Value::Integer(6), loc()).unwrap();
        scope.sweep_frame(&mut ram, level, loc()).unwrap();
        assert_eq!(scope.variables().len(), 1);
        assert_eq!(ram.high_water(), 32);
    }

    #[test]
    fn test_frames_compare_by_kind() {
        let mut a = ScopeFrame::new(FrameKind::Method);
        a.method = Some("f".into());
        let b = ScopeFrame::new(FrameKind::Method);
        assert_eq!(a, b);
        assert_ne!(a, ScopeFrame::new(FrameKind::Loop));
    }
}
