use pipe_entities::PipeUnitTrait;

/// Records the outputs of a unit driven with a sequence of inputs
pub struct Recorder<U: PipeUnitTrait> {
    pub unit: U,
    pub outputs: Vec<U::Output>,
}

impl<U: PipeUnitTrait> Recorder<U> {
    pub fn new(unit: U) -> Self {
        Self { unit, outputs: vec![] }
    }

    pub fn feed(&mut self, inputs: impl IntoIterator<Item = U::Input>) -> &mut Self {
        for input in inputs {
            let out = self.unit.tick(&input);
            self.outputs.push(out);
        }
        self
    }

    /// Indices of the recorded outputs for which `pred` holds
    pub fn hits(&self, pred: impl Fn(&U::Output) -> bool) -> Vec<usize> {
        self.outputs.iter().enumerate().filter(|(_, o)| pred(o)).map(|(i, _)| i).collect()
    }

    pub fn count(&self, pred: impl Fn(&U::Output) -> bool) -> usize {
        self.outputs.iter().filter(|o| pred(o)).count()
    }
}
