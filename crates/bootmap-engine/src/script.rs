//! iPXE boot-script rendering.
//!
//! A rendered script delivers the kernel image, its command line, and the
//! initrd image to a booting node, and ends with a retry label that sleeps
//! and chains back to the service so a failed fetch self-heals. The renderer
//! performs no I/O: image paths are emitted verbatim, and secret values enter
//! only through [`substitute_param`]'s caller-supplied retriever.

use bootmap_core::{BootConfig, Error, Result};

/// Identity parameters injected into the kernel command line.
///
/// Injection is additive: a parameter already present in the stored command
/// line wins over the injected value.
#[derive(Debug, Clone, Default)]
pub struct ScriptParams {
    /// Host identifier, injected as `hostid=`.
    pub host_id: Option<String>,
    /// Numeric node ID, injected as `nid=`.
    pub nid: Option<String>,
}

/// Returns whether a parameter with the given prefix exists in the command
/// line (e.g. `name` = `"console="`).
#[must_use]
pub fn param_exists(params: &str, name: &str) -> bool {
    params.split_whitespace().any(|token| token.starts_with(name))
}

/// Appends `name` + `value` to the command line unless a parameter with that
/// prefix is already present or `value` is empty.
#[must_use]
pub fn ensure_param(params: &str, name: &str, value: &str) -> String {
    if value.is_empty() || param_exists(params, name) {
        return params.to_string();
    }
    if params.is_empty() {
        format!("{name}{value}")
    } else {
        format!("{params} {name}{value}")
    }
}

/// Substitutes `${var}` in the command line with a lazily retrieved value.
///
/// The retriever runs only if the variable actually occurs, so callers can
/// hand over closures that fetch tokens from external services without
/// paying for unused lookups.
///
/// # Errors
///
/// Propagates the retriever's error; the command line is left unrendered in
/// that case.
pub fn substitute_param<F>(params: &str, var: &str, get_value: F) -> Result<String>
where
    F: FnOnce() -> Result<String>,
{
    let token =
        if var.starts_with("${") { var.to_string() } else { format!("${{{var}}}") };
    if !params.contains(&token) {
        return Ok(params.to_string());
    }
    let value = get_value()?;
    Ok(params.replace(&token, &value))
}

/// Renders the iPXE boot script for a resolved boot configuration.
///
/// `chain` is the full re-entry URL the retry path chains to (see
/// `ScriptConfig::chain_url` in bootmap-core). When an initrd is staged, any
/// `initrd=` token in the stored command line is superseded by the staged
/// image.
///
/// # Errors
///
/// Returns `NotFound` if the configuration has no kernel — the host is not
/// configured for booting.
pub fn render(
    config: &BootConfig,
    params: &ScriptParams,
    chain: &str,
    retry_delay_secs: u64,
) -> Result<String> {
    if config.kernel.is_empty() {
        return Err(Error::not_found("host not configured for booting"));
    }

    let mut cmdline = config.params.clone();
    if let Some(host_id) = &params.host_id {
        cmdline = ensure_param(&cmdline, "hostid=", host_id);
    }
    if let Some(nid) = &params.nid {
        cmdline = ensure_param(&cmdline, "nid=", nid);
    }

    if !config.initrd.is_empty() {
        let stripped: Vec<&str> =
            cmdline.split_whitespace().filter(|token| !token.starts_with("initrd=")).collect();
        cmdline = if stripped.is_empty() {
            "initrd=initrd".to_string()
        } else {
            format!("initrd=initrd {}", stripped.join(" "))
        };
    }

    let mut script = String::from("#!ipxe\n");
    let cmdline = cmdline.trim();
    if cmdline.is_empty() {
        script.push_str(&format!("kernel --name kernel {} || goto boot_retry\n", config.kernel));
    } else {
        script.push_str(&format!(
            "kernel --name kernel {} {cmdline} || goto boot_retry\n",
            config.kernel
        ));
    }
    if !config.initrd.is_empty() {
        script.push_str(&format!("initrd --name initrd {} || goto boot_retry\n", config.initrd));
    }
    script.push_str("boot || goto boot_retry\n:boot_retry\n");
    script.push_str(&format!("sleep {retry_delay_secs}\n{chain}\n"));
    Ok(script)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bootmap_core::ErrorKind;

    fn config(kernel: &str, initrd: &str, params: &str) -> BootConfig {
        BootConfig::new(kernel, initrd, params)
    }

    #[test]
    fn test_param_exists_matches_prefix() {
        assert!(param_exists("console=ttyS0 quiet", "console="));
        assert!(param_exists("console=ttyS0 quiet", "quiet"));
        assert!(!param_exists("console=ttyS0", "nid="));
    }

    #[test]
    fn test_ensure_param_is_additive() {
        assert_eq!(ensure_param("quiet", "nid=", "4"), "quiet nid=4");
        assert_eq!(ensure_param("nid=9 quiet", "nid=", "4"), "nid=9 quiet");
        assert_eq!(ensure_param("", "nid=", "4"), "nid=4");
        assert_eq!(ensure_param("quiet", "nid=", ""), "quiet");
    }

    #[test]
    fn test_substitute_param_is_lazy() {
        // Retriever must not run when the variable is absent.
        let out = substitute_param("quiet", "TOKEN", || {
            panic!("retriever invoked for absent variable")
        })
        .unwrap();
        assert_eq!(out, "quiet");

        let out =
            substitute_param("token=${TOKEN} quiet", "TOKEN", || Ok("abc123".to_string()))
                .unwrap();
        assert_eq!(out, "token=abc123 quiet");
    }

    #[test]
    fn test_substitute_param_propagates_retriever_error() {
        let err = substitute_param("token=${TOKEN}", "TOKEN", || {
            Err(Error::op(ErrorKind::Internal, "token service unavailable"))
        })
        .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Internal));
    }

    #[test]
    fn test_render_full_script() {
        let script = render(
            &config("http://img/kernel", "http://img/initrd", "console=ttyS0"),
            &ScriptParams { host_id: Some("n1".to_string()), nid: Some("4".to_string()) },
            "chain https://boot-gw.local/apis/bootmap/bootscript?host=n1",
            30,
        )
        .unwrap();

        let lines: Vec<&str> = script.lines().collect();
        assert_eq!(lines[0], "#!ipxe");
        assert_eq!(
            lines[1],
            "kernel --name kernel http://img/kernel initrd=initrd console=ttyS0 hostid=n1 nid=4 \
             || goto boot_retry"
        );
        assert_eq!(lines[2], "initrd --name initrd http://img/initrd || goto boot_retry");
        assert_eq!(lines[3], "boot || goto boot_retry");
        assert_eq!(lines[4], ":boot_retry");
        assert_eq!(lines[5], "sleep 30");
        assert_eq!(lines[6], "chain https://boot-gw.local/apis/bootmap/bootscript?host=n1");
    }

    #[test]
    fn test_render_supersedes_stored_initrd_token() {
        let script = render(
            &config("k", "i", "initrd=stale quiet"),
            &ScriptParams::default(),
            "chain retry",
            10,
        )
        .unwrap();
        assert!(script.contains("kernel --name kernel k initrd=initrd quiet || goto boot_retry"));
        assert!(!script.contains("initrd=stale"));
    }

    #[test]
    fn test_render_without_kernel_fails() {
        let err = render(&config("", "i", "p"), &ScriptParams::default(), "chain retry", 10)
            .unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NotFound));
    }
}
