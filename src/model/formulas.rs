//! Closed-form steady-state formulas, one family per variant.
//!
//! Each stage method reads its upstream values from [`Computed`]; the plan
//! guarantees those were evaluated first.

use crate::error::QueueResult;
use crate::math::{birth_death_term, birth_death_terms, factorial};

use super::plan::{Computed, Stage};

/// Capability set shared by every formula family.
pub(crate) trait SteadyState: std::fmt::Debug {
    /// Utilization ρ.
    fn utilization(&self) -> f64;

    /// Whether the steady state exists.
    fn is_stable(&self) -> bool {
        true
    }

    /// `Pn / P0` for occupancy `n`.
    fn state_ratio(&self, n: u64) -> f64;

    fn empty_probability(&self, m: &Computed) -> QueueResult<f64>;
    fn wait_probability(&self, m: &Computed) -> QueueResult<f64>;
    fn queue_length(&self, m: &Computed) -> QueueResult<f64>;
    fn system_length(&self, m: &Computed) -> QueueResult<f64>;
    fn non_empty_queue_length(&self, m: &Computed) -> QueueResult<f64>;
    fn queue_wait(&self, m: &Computed) -> QueueResult<f64>;
    fn system_wait(&self, m: &Computed) -> QueueResult<f64>;
    fn non_empty_queue_wait(&self, m: &Computed) -> QueueResult<f64>;
}

// =============================================================================
// M/M/1
// =============================================================================

/// Single server, infinite population.
#[derive(Debug, Clone)]
pub(crate) struct Mm1 {
    lambda: f64,
    mu: f64,
}

impl Mm1 {
    pub(crate) const fn new(lambda: f64, mu: f64) -> Self {
        Self { lambda, mu }
    }
}

impl SteadyState for Mm1 {
    fn utilization(&self) -> f64 {
        self.lambda / self.mu
    }

    fn is_stable(&self) -> bool {
        self.utilization() < 1.0
    }

    fn state_ratio(&self, n: u64) -> f64 {
        self.utilization().powf(n as f64)
    }

    fn empty_probability(&self, m: &Computed) -> QueueResult<f64> {
        Ok(1.0 - m.get(Stage::Utilization)?)
    }

    // An arrival waits whenever the server is busy.
    fn wait_probability(&self, m: &Computed) -> QueueResult<f64> {
        Ok(1.0 - m.get(Stage::EmptyProbability)?)
    }

    fn queue_length(&self, _m: &Computed) -> QueueResult<f64> {
        Ok(self.lambda * self.lambda / (self.mu * (self.mu - self.lambda)))
    }

    fn system_length(&self, _m: &Computed) -> QueueResult<f64> {
        Ok(self.lambda / (self.mu - self.lambda))
    }

    fn non_empty_queue_length(&self, m: &Computed) -> QueueResult<f64> {
        m.get(Stage::SystemLength)
    }

    fn queue_wait(&self, _m: &Computed) -> QueueResult<f64> {
        Ok(self.lambda / (self.mu * (self.mu - self.lambda)))
    }

    fn system_wait(&self, _m: &Computed) -> QueueResult<f64> {
        Ok(1.0 / (self.mu - self.lambda))
    }

    fn non_empty_queue_wait(&self, m: &Computed) -> QueueResult<f64> {
        m.get(Stage::SystemWait)
    }
}

// =============================================================================
// M/M/k (Erlang C)
// =============================================================================

/// Multiple servers, infinite population.
#[derive(Debug, Clone)]
pub(crate) struct Mmk {
    lambda: f64,
    mu: f64,
    servers: u32,
}

impl Mmk {
    pub(crate) const fn new(lambda: f64, mu: f64, servers: u32) -> Self {
        Self {
            lambda,
            mu,
            servers,
        }
    }

    fn offered_load(&self) -> f64 {
        self.lambda / self.mu
    }

    /// `kμ / (kμ - λ)`
    fn capacity_factor(&self) -> f64 {
        let capacity = f64::from(self.servers) * self.mu;
        capacity / (capacity - self.lambda)
    }

    /// `(kμ - λ)²`
    fn slack_squared(&self) -> f64 {
        let slack = f64::from(self.servers) * self.mu - self.lambda;
        slack * slack
    }
}

impl SteadyState for Mmk {
    fn utilization(&self) -> f64 {
        self.lambda / (f64::from(self.servers) * self.mu)
    }

    fn is_stable(&self) -> bool {
        self.utilization() < 1.0
    }

    // Beyond k every step multiplies by the same factor ρ.
    fn state_ratio(&self, n: u64) -> f64 {
        let r = self.offered_load();
        let k = u64::from(self.servers);
        let head = birth_death_term(n.min(k), |i| r / i as f64);
        if n <= k {
            head
        } else {
            head * self.utilization().powf((n - k) as f64)
        }
    }

    fn empty_probability(&self, _m: &Computed) -> QueueResult<f64> {
        let r = self.offered_load();
        let k = i64::from(self.servers);
        let head: f64 = (0..k).map(|n| r.powf(n as f64) / factorial(n)).sum();
        let tail = r.powf(k as f64) / factorial(k) * self.capacity_factor();
        Ok(1.0 / (head + tail))
    }

    fn wait_probability(&self, m: &Computed) -> QueueResult<f64> {
        let r = self.offered_load();
        let k = i64::from(self.servers);
        let p0 = m.get(Stage::EmptyProbability)?;
        Ok(r.powf(k as f64) / factorial(k) * self.capacity_factor() * p0)
    }

    fn queue_length(&self, m: &Computed) -> QueueResult<f64> {
        let r = self.offered_load();
        let k = i64::from(self.servers);
        let p0 = m.get(Stage::EmptyProbability)?;
        let coefficient =
            self.lambda * self.mu * r.powf(k as f64) / (factorial(k - 1) * self.slack_squared());
        Ok(coefficient * p0)
    }

    fn system_length(&self, m: &Computed) -> QueueResult<f64> {
        Ok(m.get(Stage::QueueLength)? + self.offered_load())
    }

    fn non_empty_queue_length(&self, m: &Computed) -> QueueResult<f64> {
        Ok(m.get(Stage::QueueLength)? / m.get(Stage::WaitProbability)?)
    }

    fn queue_wait(&self, m: &Computed) -> QueueResult<f64> {
        Ok(m.get(Stage::QueueLength)? / self.lambda)
    }

    fn system_wait(&self, m: &Computed) -> QueueResult<f64> {
        Ok(m.get(Stage::QueueWait)? + 1.0 / self.mu)
    }

    fn non_empty_queue_wait(&self, m: &Computed) -> QueueResult<f64> {
        Ok(m.get(Stage::QueueWait)? / m.get(Stage::WaitProbability)?)
    }
}

// =============================================================================
// Finite population
// =============================================================================

/// Unnormalized state weights of a finite-source birth-death chain.
///
/// With `i - 1` customers present, `M - i + 1` sources can still arrive and
/// `min(i, k)` servers are working, so
/// `Pn / P0 = M! / ((M - n)! · n!) · r^n` for `n < k` and
/// `M! / ((M - n)! · k! · k^(n - k)) · r^n` for `n ≥ k`.
#[derive(Debug, Clone)]
struct FiniteSource {
    lambda: f64,
    mu: f64,
    servers: u32,
    population: u32,
}

impl FiniteSource {
    const fn new(lambda: f64, mu: f64, servers: u32, population: u32) -> Self {
        Self {
            lambda,
            mu,
            servers,
            population,
        }
    }

    /// Birth-death ratio for step `i`.
    fn step(&self, i: u64) -> f64 {
        let r = self.lambda / self.mu;
        let m = f64::from(self.population);
        (m - i as f64 + 1.0) * r / i.min(u64::from(self.servers)) as f64
    }

    /// `Pn / P0` for `n = 0..=M`.
    fn weights(&self) -> impl Iterator<Item = f64> + '_ {
        birth_death_terms(u64::from(self.population), |i| self.step(i))
    }

    fn state_ratio(&self, n: u64) -> f64 {
        if n > u64::from(self.population) {
            0.0
        } else {
            birth_death_term(n, |i| self.step(i))
        }
    }

    fn empty_probability(&self) -> f64 {
        1.0 / self.weights().sum::<f64>()
    }

    /// `Lq / ((M - L) · λ)`
    fn queue_wait(&self, m: &Computed) -> QueueResult<f64> {
        let lq = m.get(Stage::QueueLength)?;
        let l = m.get(Stage::SystemLength)?;
        Ok(lq / ((f64::from(self.population) - l) * self.lambda))
    }

    fn system_wait(&self, m: &Computed) -> QueueResult<f64> {
        Ok(m.get(Stage::QueueWait)? + 1.0 / self.mu)
    }

    fn non_empty_queue_length(m: &Computed) -> QueueResult<f64> {
        Ok(m.get(Stage::QueueLength)? / m.get(Stage::WaitProbability)?)
    }

    fn non_empty_queue_wait(m: &Computed) -> QueueResult<f64> {
        Ok(m.get(Stage::QueueWait)? / m.get(Stage::WaitProbability)?)
    }
}

/// Single server, finite population.
#[derive(Debug, Clone)]
pub(crate) struct Mm1Finite {
    source: FiniteSource,
}

impl Mm1Finite {
    pub(crate) const fn new(lambda: f64, mu: f64, population: u32) -> Self {
        Self {
            source: FiniteSource::new(lambda, mu, 1, population),
        }
    }

    fn busy_fraction(m: &Computed) -> QueueResult<f64> {
        Ok(1.0 - m.get(Stage::EmptyProbability)?)
    }
}

impl SteadyState for Mm1Finite {
    fn utilization(&self) -> f64 {
        0.0
    }

    fn state_ratio(&self, n: u64) -> f64 {
        self.source.state_ratio(n)
    }

    fn empty_probability(&self, _m: &Computed) -> QueueResult<f64> {
        Ok(self.source.empty_probability())
    }

    fn wait_probability(&self, m: &Computed) -> QueueResult<f64> {
        Self::busy_fraction(m)
    }

    fn queue_length(&self, m: &Computed) -> QueueResult<f64> {
        let s = &self.source;
        Ok(f64::from(s.population) - (s.lambda + s.mu) / s.lambda * Self::busy_fraction(m)?)
    }

    fn system_length(&self, m: &Computed) -> QueueResult<f64> {
        let s = &self.source;
        Ok(f64::from(s.population) - s.mu / s.lambda * Self::busy_fraction(m)?)
    }

    fn non_empty_queue_length(&self, m: &Computed) -> QueueResult<f64> {
        FiniteSource::non_empty_queue_length(m)
    }

    fn queue_wait(&self, m: &Computed) -> QueueResult<f64> {
        self.source.queue_wait(m)
    }

    fn system_wait(&self, m: &Computed) -> QueueResult<f64> {
        self.source.system_wait(m)
    }

    fn non_empty_queue_wait(&self, m: &Computed) -> QueueResult<f64> {
        FiniteSource::non_empty_queue_wait(m)
    }
}

/// Multiple servers, finite population.
#[derive(Debug, Clone)]
pub(crate) struct MmkFinite {
    source: FiniteSource,
}

impl MmkFinite {
    pub(crate) const fn new(lambda: f64, mu: f64, servers: u32, population: u32) -> Self {
        Self {
            source: FiniteSource::new(lambda, mu, servers, population),
        }
    }

    /// `(n, Pn)` for `n` in `range`, in one pass over the weights.
    fn probabilities(
        &self,
        p0: f64,
        range: std::ops::Range<u64>,
    ) -> impl Iterator<Item = (f64, f64)> + '_ {
        let len = range.end.saturating_sub(range.start);
        self.source
            .weights()
            .enumerate()
            .skip(range.start as usize)
            .take(len as usize)
            .map(move |(n, w)| (n as f64, p0 * w))
    }
}

impl SteadyState for MmkFinite {
    fn utilization(&self) -> f64 {
        0.0
    }

    fn state_ratio(&self, n: u64) -> f64 {
        self.source.state_ratio(n)
    }

    fn empty_probability(&self, _m: &Computed) -> QueueResult<f64> {
        Ok(self.source.empty_probability())
    }

    fn wait_probability(&self, m: &Computed) -> QueueResult<f64> {
        let p0 = m.get(Stage::EmptyProbability)?;
        let idle: f64 = self
            .probabilities(p0, 0..u64::from(self.source.servers))
            .map(|(_, p)| p)
            .sum();
        Ok(1.0 - idle)
    }

    fn queue_length(&self, m: &Computed) -> QueueResult<f64> {
        let p0 = m.get(Stage::EmptyProbability)?;
        let k = f64::from(self.source.servers);
        let last = u64::from(self.source.population);
        Ok(self
            .probabilities(p0, u64::from(self.source.servers)..last + 1)
            .map(|(n, p)| (n - k) * p)
            .sum())
    }

    fn system_length(&self, m: &Computed) -> QueueResult<f64> {
        let p0 = m.get(Stage::EmptyProbability)?;
        let lq = m.get(Stage::QueueLength)?;
        let k = f64::from(self.source.servers);
        let (partial_mean, partial_mass) = self
            .probabilities(p0, 0..u64::from(self.source.servers))
            .fold((0.0, 0.0), |(mean, mass), (n, p)| (mean + n * p, mass + p));
        Ok(partial_mean + lq + k * (1.0 - partial_mass))
    }

    fn non_empty_queue_length(&self, m: &Computed) -> QueueResult<f64> {
        FiniteSource::non_empty_queue_length(m)
    }

    fn queue_wait(&self, m: &Computed) -> QueueResult<f64> {
        self.source.queue_wait(m)
    }

    fn system_wait(&self, m: &Computed) -> QueueResult<f64> {
        self.source.system_wait(m)
    }

    fn non_empty_queue_wait(&self, m: &Computed) -> QueueResult<f64> {
        FiniteSource::non_empty_queue_wait(m)
    }
}
