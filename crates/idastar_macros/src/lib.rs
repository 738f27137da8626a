use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, ItemFn, LitInt};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The function body runs under a drop guard that logs the elapsed time
/// through `tracing::info!` once the call takes longer than the threshold.
/// Without `perf_stats` the guard is compiled out entirely.
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn search(&self, grid: &Grid) -> Result<SearchReport, SearchError> {
///     // ... work ...
/// }
/// ```
///
/// # Optional Parameters
/// ```ignore
/// #[profile(5)]  // Only log calls slower than 5ms
/// pub fn flood_fill(&self) { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        let literal = parse_macro_input!(attr as LitInt);
        match literal.base10_parse::<u128>() {
            Ok(value) => value,
            Err(err) => return err.to_compile_error().into(),
        }
    };

    let input = parse_macro_input!(item as ItemFn);
    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: &'static str,
                    start: std::time::Instant,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() >= #threshold_ms {
                            ::tracing::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: concat!(module_path!(), "::", #fn_name_str),
                    start: std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}
