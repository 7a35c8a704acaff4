use proc_macro::TokenStream as TokenStream1;
use quote::{quote, ToTokens};
use syn::{self, parse_macro_input};

/// This macro is added before a method of `Simulator` struct in the impl block.
/// Use this macro to first check if current round phase is exactly the phase in
/// the attribute.
///
/// For example, `#[allowed_phase(PlaceBets)]` will make a method first check
/// if current round phase is `PlaceBets`. If not, the method will return
/// `SimulationError::WrongPhase` without touching any state.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let phase = parse_macro_input!(attr as syn::Ident);
    let mut ast = parse_macro_input!(item as syn::ImplItemFn);
    let method = ast.sig.ident.to_string();

    let early_return: proc_macro2::TokenStream = quote! {
        if self.current_round_phase != RoundPhase::#phase {
            return Err(crate::SimulationError::WrongPhase {
                method: #method,
                expected: RoundPhase::#phase,
                actual: self.current_round_phase,
            });
        }
    };
    let early_return: syn::Stmt = match syn::parse2(early_return) {
        Ok(stmt) => stmt,
        Err(err) => return err.to_compile_error().into(),
    };
    ast.block.stmts.insert(0, early_return);
    ast.into_token_stream().into()
}
