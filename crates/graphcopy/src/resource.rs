use std::fmt;

/// Error returned when a configured resource limit is exceeded while copying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// Maximum number of heap allocations exceeded.
    Allocation { limit: usize, count: usize },
    /// Maximum traversal depth exceeded.
    Recursion { limit: usize, depth: usize },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { limit, count } => {
                write!(f, "allocation limit exceeded: {count} > {limit}")
            }
            Self::Recursion { limit, depth } => {
                write!(f, "maximum recursion depth exceeded: {depth} > {limit}")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

/// Limits applied by [`LimitedTracker`].
///
/// Every limit is optional; `ResourceLimits::default()` enforces nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResourceLimits {
    /// Maximum number of live heap allocations. Entries discarded by a failed
    /// copy's rollback are given back.
    #[serde(default)]
    pub max_allocations: Option<usize>,
    /// Maximum depth of the copy traversal (longest reference chain followed).
    #[serde(default)]
    pub max_recursion_depth: Option<usize>,
}

impl ResourceLimits {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn max_allocations(mut self, limit: usize) -> Self {
        self.max_allocations = Some(limit);
        self
    }

    #[must_use]
    pub fn max_recursion_depth(mut self, limit: usize) -> Self {
        self.max_recursion_depth = Some(limit);
        self
    }
}

/// Trait for tracking heap usage and traversal depth.
///
/// The heap is generic over its tracker so that the unlimited case compiles
/// down to nothing.
pub trait ResourceTracker: fmt::Debug {
    /// Called before each heap allocation.
    ///
    /// Returns `Err(ResourceError)` if the allocation would exceed a limit.
    fn on_allocate(&mut self) -> Result<(), ResourceError>;

    /// Called when an allocation is released (heap rollback).
    fn on_free(&mut self) {}

    /// Called before descending into a heap value during a copy.
    ///
    /// # Arguments
    /// * `current_depth` - Number of heap values on the traversal path before descending
    fn check_recursion_depth(&self, current_depth: usize) -> Result<(), ResourceError>;

    /// Returns the number of live allocations tracked, if this tracker records them.
    fn allocation_count(&self) -> Option<usize> {
        None
    }
}

/// Tracker that enforces nothing.
///
/// With this tracker the traversal depth is bounded only by the call stack, so
/// a pathologically deep reference chain can overflow it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimitTracker;

impl ResourceTracker for NoLimitTracker {
    #[inline]
    fn on_allocate(&mut self) -> Result<(), ResourceError> {
        Ok(())
    }

    #[inline]
    fn check_recursion_depth(&self, _current_depth: usize) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// Tracker enforcing [`ResourceLimits`].
#[derive(Debug, Clone, Default)]
pub struct LimitedTracker {
    limits: ResourceLimits,
    allocation_count: usize,
}

impl LimitedTracker {
    #[must_use]
    pub fn new(limits: ResourceLimits) -> Self {
        Self {
            limits,
            allocation_count: 0,
        }
    }

    #[must_use]
    pub fn limits(&self) -> &ResourceLimits {
        &self.limits
    }
}

impl ResourceTracker for LimitedTracker {
    fn on_allocate(&mut self) -> Result<(), ResourceError> {
        if let Some(max) = self.limits.max_allocations
            && self.allocation_count >= max
        {
            return Err(ResourceError::Allocation {
                limit: max,
                count: self.allocation_count + 1,
            });
        }
        self.allocation_count += 1;
        Ok(())
    }

    fn on_free(&mut self) {
        self.allocation_count = self.allocation_count.saturating_sub(1);
    }

    fn check_recursion_depth(&self, current_depth: usize) -> Result<(), ResourceError> {
        match self.limits.max_recursion_depth {
            Some(limit) if current_depth >= limit => Err(ResourceError::Recursion {
                limit,
                depth: current_depth + 1,
            }),
            _ => Ok(()),
        }
    }

    fn allocation_count(&self) -> Option<usize> {
        Some(self.allocation_count)
    }
}
