//! Which secure storage backend the host can offer.
//!
//! Apple and Windows targets always have a system keychain. Android keeps
//! credentials in the app sandbox. Linux needs a Secret Service daemon, which
//! only exists inside a graphical session with a D-Bus session bus, and never
//! under WSL.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecureStorageCapability {
    SystemKeyring,
    /// Credentials go to files under the app data root.
    FileBasedKeystore,
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HostFamily {
    Apple,
    Windows,
    Android,
    Linux,
    Other,
}

impl HostFamily {
    fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Apple
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "android") {
            Self::Android
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }
}

/// What a Linux host exposes to a keyring client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LinuxSession {
    wsl: bool,
    display: bool,
    session_bus: bool,
}

impl LinuxSession {
    fn probe() -> Self {
        let kernel = std::fs::read_to_string("/proc/version").unwrap_or_default();
        let has_var = |name: &str| std::env::var_os(name).is_some();
        Self {
            wsl: kernel.contains("Microsoft")
                || kernel.contains("WSL")
                || has_var("WSL_DISTRO_NAME")
                || has_var("WSL_INTEROP"),
            display: has_var("DISPLAY") || has_var("WAYLAND_DISPLAY"),
            session_bus: has_var("DBUS_SESSION_BUS_ADDRESS"),
        }
    }
}

fn capability_for(family: HostFamily, session: LinuxSession) -> SecureStorageCapability {
    match family {
        HostFamily::Apple | HostFamily::Windows => SecureStorageCapability::SystemKeyring,
        HostFamily::Android => SecureStorageCapability::FileBasedKeystore,
        HostFamily::Linux if session.wsl => SecureStorageCapability::FileBasedKeystore,
        HostFamily::Linux if session.display && session.session_bus => {
            SecureStorageCapability::SystemKeyring
        }
        HostFamily::Linux => SecureStorageCapability::FileBasedKeystore,
        HostFamily::Other => SecureStorageCapability::Unsupported,
    }
}

/// Pick the backend for this host. Only Linux inspects its environment.
pub fn detect_storage_capability() -> SecureStorageCapability {
    let family = HostFamily::current();
    let session = if family == HostFamily::Linux {
        LinuxSession::probe()
    } else {
        LinuxSession::default()
    };

    let capability = capability_for(family, session);
    match capability {
        SecureStorageCapability::Unsupported => {
            log::error!("No secure storage backend for this platform")
        }
        SecureStorageCapability::FileBasedKeystore if family == HostFamily::Linux => {
            log::warn!("No usable keyring session ({session:?}); credentials stored in files")
        }
        _ => log::info!("Secure storage capability for {family:?}: {capability:?}"),
    }
    capability
}
