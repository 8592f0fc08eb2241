//! Ordering of the compute work inside one simulation step.
//!
//! Each phase declares the buffers it reads and writes. A barrier goes
//! between two consecutive phases whenever one of them writes something the
//! other touches. On wgpu a barrier is a compute pass boundary: the driver
//! derives the actual memory barriers from the usage recorded in each pass.

use std::ops::Range;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Resource {
    Particles,
    Constraints,
    Params,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    Integrate,
    Constraint { iteration: u32 },
    Normal,
    /// The vertex stage of the cloth mesh draw.
    Draw,
}

impl Phase {
    pub fn reads(self) -> &'static [Resource] {
        match self {
            Phase::Integrate => &[Resource::Particles, Resource::Params],
            Phase::Constraint { .. } => &[Resource::Particles, Resource::Constraints],
            Phase::Normal => &[Resource::Particles],
            Phase::Draw => &[Resource::Particles],
        }
    }

    pub fn writes(self) -> &'static [Resource] {
        match self {
            Phase::Integrate | Phase::Constraint { .. } | Phase::Normal => &[Resource::Particles],
            Phase::Draw => &[],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Integrate => "Cloth Integrate Pass",
            Phase::Constraint { .. } => "Cloth Constraint Pass",
            Phase::Normal => "Cloth Normal Pass",
            Phase::Draw => "Cloth Draw",
        }
    }
}

/// Read-after-write, write-after-read or write-after-write on any shared resource.
pub fn needs_barrier(previous: Phase, next: Phase) -> bool {
    let touches = |phase: Phase, resource: &Resource| {
        phase.reads().contains(resource) || phase.writes().contains(resource)
    };
    previous.writes().iter().any(|r| touches(next, r))
        || next.writes().iter().any(|r| previous.reads().contains(r))
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ScheduledPhase {
    pub phase: Phase,
    pub barrier_before: bool,
}

/// The ordered phases of one fixed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSchedule {
    phases: Vec<ScheduledPhase>,
    // Runs of phases that can share one compute pass
    passes: Vec<Range<usize>>,
}

impl StepSchedule {
    /// Integrate, `iterations` constraint passes (none without constraints), Normal.
    pub fn new(constraint_iterations: u32, has_constraints: bool) -> Self {
        let iterations = if has_constraints { constraint_iterations } else { 0 };
        let order = std::iter::once(Phase::Integrate)
            .chain((0..iterations).map(|iteration| Phase::Constraint { iteration }))
            .chain(std::iter::once(Phase::Normal));

        let mut phases: Vec<ScheduledPhase> = Vec::with_capacity(iterations as usize + 2);
        for phase in order {
            // The first phase is ordered against the previous step's Normal pass
            let previous = phases.last().map_or(Phase::Normal, |p| p.phase);
            phases.push(ScheduledPhase {
                phase,
                barrier_before: needs_barrier(previous, phase),
            });
        }

        let mut passes = Vec::new();
        let mut start = 0;
        for (index, scheduled) in phases.iter().enumerate().skip(1) {
            if scheduled.barrier_before {
                passes.push(start..index);
                start = index;
            }
        }
        if start < phases.len() {
            passes.push(start..phases.len());
        }

        Self { phases, passes }
    }

    /// Phases grouped by the barriers between them.
    pub fn passes(&self) -> impl Iterator<Item = &[ScheduledPhase]> {
        self.passes.iter().map(|range| &self.phases[range.clone()])
    }

    pub fn phases(&self) -> &[ScheduledPhase] {
        &self.phases
    }

    pub fn barrier_count(&self) -> usize {
        self.phases.iter().filter(|p| p.barrier_before).count()
    }

    /// Whether the draw must wait on the last phase of the step.
    pub fn barrier_before_draw(&self) -> bool {
        self.phases
            .last()
            .is_some_and(|last| needs_barrier(last.phase, Phase::Draw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_phase_is_separated() {
        let schedule = StepSchedule::new(3, true);
        let phases: Vec<Phase> = schedule.phases().iter().map(|p| p.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Integrate,
                Phase::Constraint { iteration: 0 },
                Phase::Constraint { iteration: 1 },
                Phase::Constraint { iteration: 2 },
                Phase::Normal,
            ]
        );
        assert!(schedule.phases().iter().all(|p| p.barrier_before));
        assert!(schedule.barrier_before_draw());
        assert!(schedule.passes().all(|pass| pass.len() == 1));
        assert_eq!(schedule.passes().count(), 5);
    }

    #[test]
    fn constraint_phase_is_skipped_without_constraints() {
        let schedule = StepSchedule::new(5, false);
        assert_eq!(schedule.phases().len(), 2);
        assert_eq!(schedule.barrier_count(), 2);
        // Normal still writes the particles the draw reads
        assert!(schedule.barrier_before_draw());
    }

    #[test]
    fn readers_do_not_conflict() {
        assert!(!needs_barrier(Phase::Draw, Phase::Draw));
        assert!(needs_barrier(Phase::Draw, Phase::Integrate));
        assert!(needs_barrier(Phase::Normal, Phase::Draw));
    }
}
