use na::Vector3;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    pattern::{evaluate, Elapsed, ForcePattern, PatternParams},
    sink::ForceSink,
    types::{Float, Time},
};

/// Which counter a pattern is evaluated against.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[default]
    Time,
    Ticks,
}

/// Simulation time and step counters for one run.
///
/// Owned by the host loop. The time advances by each step's dt, the tick
/// counter by exactly one per driver invocation once warm-up is over. Neither
/// is ever reset mid-run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PatternClock {
    time: Time,
    iteration: u64,
    warmup: Time,
}

impl PatternClock {
    pub fn new() -> Self {
        PatternClock::default()
    }

    /// Hold the pattern back for the first `warmup` seconds of the run.
    pub fn with_warmup(mut self, warmup: Time) -> Self {
        self.warmup = warmup.max(0.0);
        self
    }

    /// Simulation time since the run started.
    pub fn time(&self) -> Time {
        self.time
    }

    /// Time since the pattern started, i.e. after warm-up.
    pub fn pattern_time(&self) -> Time {
        self.time - self.warmup
    }

    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn is_warming_up(&self) -> bool {
        self.warmup > 0.0 && self.time <= self.warmup
    }

    pub fn elapsed(&self, domain: Domain) -> Elapsed {
        match domain {
            Domain::Time => Elapsed::Time(self.pattern_time()),
            Domain::Ticks => Elapsed::Ticks(self.iteration),
        }
    }

    pub fn advance(&mut self, dt: Time) {
        self.time += dt;
    }

    pub fn tick(&mut self) {
        self.iteration += 1;
    }
}

/// How a computed pattern value is handed to the host body.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Application {
    /// Continuous force for the coming step.
    #[default]
    Force,
    /// Impulse of force * dt, for hosts that sub-step and take impulses only.
    Impulse,
    /// A single impulse of force * scale on the first step whose force is
    /// non-zero.
    OneShotImpulse { scale: Float },
}

/// Per-step glue between a force pattern and a host body.
#[derive(Clone, Debug)]
pub struct ForceDriver {
    selector: i64,
    pattern: Option<ForcePattern>,
    domain: Domain,
    params: PatternParams,
    application: Application,
    /// Point of application relative to the centre of mass, world frame
    offset: Vector3<Float>,
    fired: bool,
}

impl ForceDriver {
    pub fn new(selector: i64, domain: Domain, params: PatternParams) -> Self {
        let pattern = ForcePattern::from_selector(selector);
        if pattern.is_none() {
            warn!(selector, "unknown force pattern selector, no force will be applied");
        }

        ForceDriver {
            selector,
            pattern,
            domain,
            params,
            application: Application::Force,
            offset: Vector3::zeros(),
            fired: false,
        }
    }

    pub fn with_application(mut self, application: Application) -> Self {
        self.application = application;
        self
    }

    pub fn with_offset(mut self, offset: Vector3<Float>) -> Self {
        self.offset = offset;
        self
    }

    pub fn selector(&self) -> i64 {
        self.selector
    }

    pub fn pattern(&self) -> Option<ForcePattern> {
        self.pattern
    }

    pub fn domain(&self) -> Domain {
        self.domain
    }

    pub fn params(&self) -> &PatternParams {
        &self.params
    }

    /// Force the pattern prescribes at the clock's current reading. Zero
    /// during warm-up and for an unknown selector.
    pub fn force(&self, clock: &PatternClock) -> Vector3<Float> {
        match self.pattern {
            Some(pattern) if !clock.is_warming_up() => {
                evaluate(pattern, clock.elapsed(self.domain), &self.params)
            }
            _ => Vector3::zeros(),
        }
    }

    /// Evaluate the pattern for this step and hand it to the host.
    ///
    /// The returned force is the evaluated one, which is what gets logged
    /// regardless of the application mode. In the tick domain the clock's
    /// counter advances by one after evaluation.
    pub fn step<S: ForceSink>(
        &mut self,
        clock: &mut PatternClock,
        dt: Time,
        sink: &mut S,
    ) -> AppliedLoad {
        if clock.is_warming_up() {
            return AppliedLoad::default();
        }

        let force = self.force(clock);
        let impulse = match self.application {
            Application::Force => {
                sink.apply_force(&force, &self.offset);
                force * dt as Float
            }
            Application::Impulse => {
                let impulse = force * dt as Float;
                sink.apply_impulse(&impulse, &self.offset);
                impulse
            }
            // Held back until the pattern produces a non-zero force
            Application::OneShotImpulse { scale }
                if !self.fired && force != Vector3::zeros() =>
            {
                let impulse = force * scale;
                sink.apply_impulse(&impulse, &self.offset);
                self.fired = true;
                impulse
            }
            Application::OneShotImpulse { .. } => Vector3::zeros(),
        };

        if self.domain == Domain::Ticks {
            clock.tick();
        }
        AppliedLoad { force, impulse }
    }
}

/// Outcome of one driver step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AppliedLoad {
    /// Force the pattern prescribes for the step
    pub force: Vector3<Float>,
    /// Momentum actually delivered to the host during the step
    pub impulse: Vector3<Float>,
}
