mod accordion;
mod wizard;

pub use accordion::{normalize_salary, AccordionHandler};
pub use wizard::WizardHandler;
