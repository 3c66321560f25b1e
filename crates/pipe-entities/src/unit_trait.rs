use pipe_core::PipeUnit;

/// Trait for synchronous link units
/// Outputs are computed from the registers as they were before the tick and
/// the current inputs. Registers update once per tick.
pub trait PipeUnitTrait {
    type Input;
    type Output;

    /// Returns the unit type identifier
    fn unit(&self) -> PipeUnit;

    /// Advance one system clock cycle
    fn tick(&mut self, input: &Self::Input) -> Self::Output;

    /// Return to the power-on state
    fn reset(&mut self);
}
