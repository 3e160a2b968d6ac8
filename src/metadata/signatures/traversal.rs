//! Iterative walks along the child links of a signature.
//!
//! Wrapper chains are shallow in compiler output but the arena does not bound them, so
//! every walk here is a loop capped at one visit per node of the arena. A chain that would
//! take more steps than that must contain a cycle (possible only with hand-built ids) and is
//! reported as absent.

use crate::metadata::signatures::{SigId, SignatureArena, SignatureTag, TypeSig};

/// Returns the innermost terminal node of the chain starting at `id`
///
/// Follows child links through every wrapper. Returns `None` if a wrapper has no child, an
/// id does not resolve, or the chain does not end within the size of the arena.
///
/// # Examples
///
/// ```rust
/// use dotsig::metadata::signatures::{leaf_sig, SignatureArena};
///
/// let mut arena = SignatureArena::new();
/// let var = arena.var(0);
/// let ptr = arena.ptr(var);
/// let by_ref = arena.by_ref(ptr);
///
/// assert_eq!(leaf_sig(&arena, by_ref), Some(var));
/// assert_eq!(leaf_sig(&arena, var), Some(var));
/// ```
#[must_use]
pub fn leaf_sig(arena: &SignatureArena, id: SigId) -> Option<SigId> {
    let mut current = id;

    for _ in 0..=arena.len() {
        let sig = arena.get(current)?;
        if sig.is_leaf() {
            return Some(current);
        }
        current = sig.next()?;
    }

    None
}

/// Iterator over a chain of nodes, from the outermost wrapper to the innermost node
///
/// Created by [`chain`]. Yields only ids that resolve in the arena.
pub struct SigChain<'a> {
    arena: &'a SignatureArena,
    current: Option<SigId>,
    remaining: usize,
}

impl<'a> Iterator for SigChain<'a> {
    type Item = (SigId, &'a TypeSig);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let id = self.current?;
        let sig = self.arena.get(id)?;
        self.current = sig.next();
        Some((id, sig))
    }
}

/// Walks the chain starting at `id`
///
/// # Examples
///
/// ```rust
/// use dotsig::metadata::signatures::{chain, SignatureArena, SignatureTag};
///
/// let mut arena = SignatureArena::new();
/// let var = arena.var(0);
/// let array = arena.sz_array(var);
/// let ptr = arena.ptr(array);
///
/// let tags: Vec<SignatureTag> = chain(&arena, ptr).map(|(_, sig)| sig.tag()).collect();
/// assert_eq!(tags, vec![SignatureTag::Ptr, SignatureTag::SzArray, SignatureTag::Var]);
/// ```
#[must_use]
pub fn chain(arena: &SignatureArena, id: SigId) -> SigChain<'_> {
    SigChain {
        arena,
        current: Some(id),
        remaining: arena.len(),
    }
}

/// Skips all leading custom modifiers
#[must_use]
pub fn remove_modifiers(arena: &SignatureArena, id: Option<SigId>) -> Option<SigId> {
    let mut current = id;

    for _ in 0..=arena.len() {
        let candidate = current?;
        match arena.tag(candidate) {
            Some(SignatureTag::CModReqd | SignatureTag::CModOpt) => {
                current = arena.next(candidate);
            }
            _ => return Some(candidate),
        }
    }

    None
}

/// Skips a leading pinned marker
#[must_use]
pub fn remove_pinned(arena: &SignatureArena, id: Option<SigId>) -> Option<SigId> {
    let candidate = id?;
    match arena.tag(candidate) {
        Some(SignatureTag::Pinned) => arena.next(candidate),
        _ => Some(candidate),
    }
}

/// Skips leading custom modifiers, a pinned marker, and the modifiers after it
#[must_use]
pub fn remove_pinned_and_modifiers(arena: &SignatureArena, id: Option<SigId>) -> Option<SigId> {
    let stripped = remove_modifiers(arena, id);
    match stripped.and_then(|candidate| arena.tag(candidate)) {
        Some(SignatureTag::Pinned) => {
            remove_modifiers(arena, stripped.and_then(|candidate| arena.next(candidate)))
        }
        _ => stripped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::token::Token;

    #[test]
    fn test_leaf_sig_through_wrappers() {
        let mut arena = SignatureArena::new();
        let class = arena.class(Token::new(0x0200_0001));
        let ptr = arena.ptr(class);
        let by_ref = arena.by_ref(ptr);
        let sz = arena.sz_array(by_ref);

        assert_eq!(leaf_sig(&arena, sz), Some(class));
        assert_eq!(leaf_sig(&arena, class), Some(class));
    }

    #[test]
    fn test_leaf_sig_absent_child() {
        let mut arena = SignatureArena::new();
        let dangling = arena.ptr(None);
        let outer = arena.sz_array(dangling);

        assert_eq!(leaf_sig(&arena, outer), None);
        assert_eq!(leaf_sig(&arena, SigId::new(50)), None);
    }

    #[test]
    fn test_leaf_sig_long_chain() {
        let mut arena = SignatureArena::new();
        let var = arena.var(3);
        let mut current = var;
        for _ in 0..100_000 {
            current = arena.ptr(current);
        }

        assert_eq!(leaf_sig(&arena, current), Some(var));
    }

    #[test]
    fn test_leaf_sig_cycle() {
        let mut arena = SignatureArena::new();
        // Node 0 points at node 1 and node 1 back at node 0
        let first = arena.ptr(SigId::new(1));
        let _second = arena.ptr(first);

        assert_eq!(leaf_sig(&arena, first), None);
        assert_eq!(chain(&arena, first).count(), arena.len());
    }

    #[test]
    fn test_chain_order() {
        let mut arena = SignatureArena::new();
        let var = arena.mvar(0);
        let array = arena.array_with_rank(var, 2);
        let ptr = arena.ptr(array);

        let ids: Vec<SigId> = chain(&arena, ptr).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ptr, array, var]);

        let dangling = arena.ptr(None);
        assert_eq!(chain(&arena, dangling).count(), 1);
    }

    #[test]
    fn test_remove_modifiers_and_pinned() {
        let mut arena = SignatureArena::new();
        let modifier = Token::new(0x0100_0007);
        let var = arena.var(0);
        let inner_mod = arena.cmod_opt(modifier, var);
        let pinned = arena.pinned(inner_mod);
        let outer_req = arena.cmod_reqd(modifier, pinned);
        let outer_opt = arena.cmod_opt(modifier, outer_req);

        assert_eq!(remove_modifiers(&arena, Some(outer_opt)), Some(pinned));
        assert_eq!(remove_pinned(&arena, Some(pinned)), Some(inner_mod));
        assert_eq!(remove_pinned(&arena, Some(var)), Some(var));
        assert_eq!(
            remove_pinned_and_modifiers(&arena, Some(outer_opt)),
            Some(var)
        );
        assert_eq!(remove_pinned_and_modifiers(&arena, Some(var)), Some(var));
        assert_eq!(remove_modifiers(&arena, None), None);

        let dangling = arena.cmod_opt(modifier, None);
        assert_eq!(remove_modifiers(&arena, Some(dangling)), None);
    }
}
