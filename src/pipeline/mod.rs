pub mod risk; // Care-log risk assessment: prompt, chat call, JSON recovery
