/// Objective wrapper that counts evaluations against an optional budget.
pub(crate) struct Counted<F> {
    objective: F,
    nfev: usize,
    max_evaluations: Option<usize>,
}

impl<F> Counted<F> {
    pub(crate) fn new(objective: F, max_evaluations: Option<usize>) -> Self {
        Self {
            objective,
            nfev: 0,
            max_evaluations,
        }
    }

    pub(crate) fn nfev(&self) -> usize {
        self.nfev
    }

    pub(crate) fn exhausted(&self) -> bool {
        self.max_evaluations.is_some_and(|max| self.nfev >= max)
    }

    pub(crate) fn call<E>(&mut self, x: &[f64]) -> Result<f64, E>
    where
        F: FnMut(&[f64]) -> Result<f64, E>,
    {
        self.nfev += 1;
        (self.objective)(x)
    }
}
