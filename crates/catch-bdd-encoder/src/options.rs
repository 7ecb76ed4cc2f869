/// Options controlling [`crate::emit_catch`]'s output (§4.5). All
/// fields have defaults matching the reference tool's skeleton
/// generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Emit the one-line hint comments (`// set up initial state`, …)
    /// inside Given/When/Then bodies.
    pub hint_flag: bool,
    /// Text placed between a macro name and its title, e.g. `( "`.
    pub open_paren: String,
    /// Text placed between a title and the closing `)`, e.g. `" )`.
    pub close_paren: String,
    /// One level of indentation.
    pub indent_unit: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            hint_flag: true,
            open_paren: "( \"".to_string(),
            close_paren: "\" )".to_string(),
            indent_unit: "    ".to_string(),
        }
    }
}
