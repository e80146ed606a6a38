/// Per-element capability flags for faces and edges.
///
/// Kept as plain booleans rather than OR'd bit masks; the one invariant that
/// matters is that a face can only carry a stencil while it exists, which
/// [`crate::block::stenciled::StenciledBlock`] restores whenever existence
/// changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementFlags {
    /// The element is part of the mesh (ghost elements past a singular
    /// corner are not).
    pub exists: bool,
    /// The element lies in the block's true domain, not in a ghost layer.
    pub interior: bool,
    /// The face hosts a full set of reconstruction stencils.
    pub stencil: bool,
}

impl ElementFlags {
    pub fn present(interior: bool) -> Self {
        Self {
            exists: true,
            interior,
            stencil: false,
        }
    }

    pub fn absent() -> Self {
        Self {
            exists: false,
            interior: false,
            stencil: false,
        }
    }

    #[inline]
    pub fn has_stencil(&self) -> bool {
        self.stencil
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_elements_carry_nothing() {
        let f = ElementFlags::absent();
        assert!(!f.exists && !f.interior && !f.has_stencil());
    }
}
