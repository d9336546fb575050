use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, LitInt, Pat};

/// Time a navigation system when the `perf_stats` feature is enabled.
///
/// The function body is wrapped in a guard that logs its duration on exit.
/// Nothing is emitted into the body when the feature is off.
///
/// A parameter named `tick` whose type mentions `NavTick` is picked up
/// automatically, and the guard then also logs on every hundredth tick.
///
/// ```ignore
/// #[profile]
/// pub fn resolve_agent_movement(tick: Res<NavTick>, /* ... */) { }
///
/// #[profile(4)] // log when slower than 4 ms
/// pub fn rebuild_rasterizer(/* ... */) { }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        let lit = parse_macro_input!(attr as LitInt);
        match lit.base10_parse::<u128>() {
            Ok(value) => value,
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let has_tick_param = sig.inputs.iter().any(|arg| {
        let FnArg::Typed(pat_type) = arg else {
            return false;
        };
        let Pat::Ident(pat_ident) = &*pat_type.pat else {
            return false;
        };
        let ty = &pat_type.ty;
        pat_ident.ident == "tick" && quote!(#ty).to_string().contains("NavTick")
    });

    let tick_field = if has_tick_param {
        quote! { tick_value: Some(tick.0), }
    } else {
        quote! { tick_value: None, }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct NavProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                    tick_value: Option<u64>,
                }
                impl Drop for NavProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        let on_interval = self.tick_value.is_some_and(|t| t % 100 == 0);
                        if elapsed.as_millis() > #threshold_ms || on_interval {
                            bevy::prelude::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                NavProfileGuard {
                    name: #fn_name_str,
                    start: std::time::Instant::now(),
                    #tick_field
                }
            };

            #block
        }
    };

    output.into()
}
