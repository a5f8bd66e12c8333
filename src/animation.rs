//! Animation driver contract.
//!
//! The tree never waits for an animation. It hands the rows of one transition to the
//! [`Animator`] under a fresh [`AnimationToken`] and finalizes the transition when the
//! host reports completion through `Tree::animation_finished`. Completion reports for
//! unknown or already finalized tokens are ignored.

use std::time::Duration;

/// Identifies one running row transition.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationToken(pub(crate) u64);

impl AnimationToken {
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Visual transition applied to a set of rows.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    /// A single row appears (filter or insert).
    SlideDown,
    /// A single row disappears.
    SlideUp,
    /// The rows revealed by an expansion open as one block.
    HeightOpen,
    /// The rows hidden by a collapse close as one block.
    HeightClose,
}

impl AnimationKind {
    #[inline]
    pub const fn is_hiding(self) -> bool {
        matches!(self, Self::SlideUp | Self::HeightClose)
    }

    /// The transition playing this one backwards.
    #[inline]
    pub const fn reversed(self) -> Self {
        match self {
            Self::SlideDown => Self::SlideUp,
            Self::SlideUp => Self::SlideDown,
            Self::HeightOpen => Self::HeightClose,
            Self::HeightClose => Self::HeightOpen,
        }
    }
}

/// Drives row transitions for the tree.
pub trait Animator<H> {
    /// Starts `kind` on `targets`. Returns `false` if nothing was started; the tree then
    /// finalizes the transition immediately.
    fn animate(
        &mut self,
        token: AnimationToken,
        targets: &[H],
        kind: AnimationKind,
        duration: Duration,
    ) -> bool;

    /// Stops the transition without reporting completion. The tree finalizes it right after.
    fn stop(&mut self, token: AnimationToken);
}

/// Animator that never animates; every transition completes synchronously.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAnimation;

impl<H> Animator<H> for NoAnimation {
    #[inline]
    fn animate(
        &mut self,
        _token: AnimationToken,
        _targets: &[H],
        _kind: AnimationKind,
        _duration: Duration,
    ) -> bool {
        false
    }

    #[inline]
    fn stop(&mut self, _token: AnimationToken) {}
}

/// A transition handed to a [`QueuedAnimator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedAnimation {
    pub token: AnimationToken,
    pub kind: AnimationKind,
    pub rows: usize,
    pub duration: Duration,
}

/// Animator that queues transitions for the host to complete later.
///
/// Drain with [`QueuedAnimator::drain`] and report each token back to the tree.
#[derive(Clone, Debug, Default)]
pub struct QueuedAnimator {
    pending: Vec<QueuedAnimation>,
    stopped: usize,
}

impl QueuedAnimator {
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
            stopped: 0,
        }
    }

    #[inline]
    pub fn pending(&self) -> &[QueuedAnimation] {
        &self.pending
    }

    /// Number of transitions stopped before completion.
    #[inline]
    pub const fn stopped(&self) -> usize {
        self.stopped
    }

    pub fn drain(&mut self) -> Vec<QueuedAnimation> {
        std::mem::take(&mut self.pending)
    }
}

impl<H> Animator<H> for QueuedAnimator {
    fn animate(
        &mut self,
        token: AnimationToken,
        targets: &[H],
        kind: AnimationKind,
        duration: Duration,
    ) -> bool {
        self.pending.push(QueuedAnimation {
            token,
            kind,
            rows: targets.len(),
            duration,
        });
        true
    }

    fn stop(&mut self, token: AnimationToken) {
        let before = self.pending.len();
        self.pending.retain(|animation| animation.token != token);
        if self.pending.len() != before {
            self.stopped += 1;
        }
    }
}
