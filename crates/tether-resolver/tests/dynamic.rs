use semver::Version;
use tether_core::{Capability, Module, ModuleId, ModuleRegistry, Requirement};
use tether_resolver::Resolver;

fn v(major: u64) -> Version {
    Version::new(major, 0, 0)
}

fn id(s: &str) -> ModuleId {
    ModuleId::new(s)
}

/// Register `modules` and resolve then commit `root`.
fn resolved(modules: Vec<Module>, root: &str) -> ModuleRegistry {
    let mut reg = ModuleRegistry::new();
    for m in modules {
        reg.add(m).unwrap();
    }
    let resolution = Resolver::new().resolve(&reg, &id(root)).unwrap();
    reg.commit(resolution.wires);
    reg
}

#[test]
fn wildcard_dynamic_import_wires_a_provider() {
    let mut reg = resolved(
        vec![
            Module::builder("app", "app", v(1))
                .dynamic_import("com.acme.*")
                .finish(),
            Module::builder("plugin", "plugin", v(1))
                .export("com.acme.web")
                .import("com.acme.util")
                .finish(),
            Module::builder("util", "util", v(1)).export("com.acme.util").finish(),
        ],
        "app",
    );

    let import = Resolver::new()
        .resolve_dynamic(&reg, &id("app"), "com.acme.web")
        .unwrap();
    assert_eq!(import.wire.importer, id("app"));
    assert_eq!(import.wire.exporter, id("plugin"));
    assert_eq!(import.wire.capability.name, "com.acme.web");
    // the wire keeps the declared dynamic requirement
    assert_eq!(import.wire.requirement.name, "com.acme.*");
    assert_eq!(import.wires.len(), 2);
    assert_eq!(import.wires[&id("plugin")][0].exporter, id("util"));

    reg.commit(import.wires);
    assert!(reg.attach_wire(import.wire));
    let app = reg.get(&id("app")).unwrap();
    assert!(app.wires().iter().any(|w| w.has_package("com.acme.web")));

    // a second lookup finds the existing wire and does nothing
    assert!(Resolver::new()
        .resolve_dynamic(&reg, &id("app"), "com.acme.web")
        .is_none());
}

#[test]
fn dynamic_import_needs_a_matching_pattern() {
    let reg = resolved(
        vec![
            Module::builder("app", "app", v(1))
                .export("com.acme.own")
                .dynamic_import("com.acme.*")
                .finish(),
            Module::builder("lib", "lib", v(1))
                .export("org.other")
                .export("com.acme.own")
                .finish(),
        ],
        "app",
    );
    let resolver = Resolver::new();
    assert!(resolver.resolve_dynamic(&reg, &id("app"), "org.other").is_none());
    assert!(resolver.resolve_dynamic(&reg, &id("app"), "com.acme.own").is_none());
    assert!(resolver.resolve_dynamic(&reg, &id("app"), "com.acme.absent").is_none());
}

#[test]
fn unresolvable_provider_is_skipped() {
    let reg = resolved(
        vec![
            Module::builder("app", "app", v(1)).dynamic_import("*").finish(),
            Module::builder("broken", "broken", v(2))
                .export("p")
                .import("missing")
                .finish(),
            Module::builder("fine", "fine", v(1)).export("p").finish(),
        ],
        "app",
    );
    let import = Resolver::new().resolve_dynamic(&reg, &id("app"), "p").unwrap();
    assert_eq!(import.wire.exporter, id("fine"));
    assert!(!import.wires.contains_key(&id("broken")));
}

#[test]
fn provider_conflicting_with_the_importer_is_skipped() {
    let vendor_q = Capability::for_package(id("b"), "q", v(1)).with_attribute("vendor", "b");
    let reg = resolved(
        vec![
            Module::builder("app", "app", v(1))
                .import("q")
                .dynamic_import("*")
                .finish(),
            Module::builder("x", "x", v(1)).export("q").finish(),
            Module::builder("b", "b", v(1)).capability(vendor_q).finish(),
            Module::builder("pinned", "pinned", v(2))
                .export_uses("dyn", &["q"])
                .requirement(Requirement::import("q").with_attribute("vendor", "b"))
                .finish(),
            Module::builder("open", "open", v(1))
                .export_uses("dyn", &["q"])
                .import("q")
                .finish(),
        ],
        "app",
    );
    assert_eq!(reg.get(&id("app")).unwrap().wires()[0].exporter, id("x"));

    let import = Resolver::new().resolve_dynamic(&reg, &id("app"), "dyn").unwrap();
    assert_eq!(import.wire.exporter, id("open"));
    // resolved providers come first, so open shares app's q
    assert_eq!(import.wires[&id("open")][0].exporter, id("x"));
}

#[test]
fn resolved_provider_needs_no_new_wires() {
    let mut reg = resolved(
        vec![
            Module::builder("app", "app", v(1)).dynamic_import("p").finish(),
            Module::builder("lib", "lib", v(1)).export("p").finish(),
        ],
        "app",
    );
    let resolution = Resolver::new().resolve(&reg, &id("lib")).unwrap();
    reg.commit(resolution.wires);

    let import = Resolver::new().resolve_dynamic(&reg, &id("app"), "p").unwrap();
    assert_eq!(import.wire.exporter, id("lib"));
    assert!(import.wires.is_empty());
}
