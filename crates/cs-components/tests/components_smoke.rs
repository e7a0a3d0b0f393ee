//! End-to-end checks of components against recording engine/module stand-ins.

use cs_components::*;
use cs_inventory::{Overrides, PropertyValue};
use proptest::prelude::*;
use serde_json::json;

#[derive(Default)]
struct RecordingEngine {
    pushes: Vec<(String, EngineProperties)>,
}

impl EngineHandle for RecordingEngine {
    fn set_properties(
        &mut self,
        section: &str,
        properties: &EngineProperties,
    ) -> Result<(), EngineFault> {
        self.pushes.push((section.to_string(), properties.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct RecordingModule {
    calls: Vec<&'static str>,
}

impl NativeModule for RecordingModule {
    fn full_sphere_launch(&mut self) -> Result<(), EngineFault> {
        self.calls.push("full_sphere_launch");
        Ok(())
    }

    fn regional_sphere_launch(&mut self) -> Result<(), EngineFault> {
        self.calls.push("regional_sphere_launch");
        Ok(())
    }
}

#[test]
fn output_defaults_reach_engine_once() {
    let mut output = Output::new().unwrap();
    output.configure(&Overrides::new()).unwrap();

    let mut engine = RecordingEngine::default();
    output.push_properties(&mut engine).unwrap();

    assert_eq!(engine.pushes.len(), 1);
    let (section, props) = &engine.pushes[0];
    assert_eq!(section, "output");

    let expected = [
        ("output_format", json!("ascii-local")),
        ("output_optional", json!("surf,botm")),
        ("cb_block_size", json!(1_048_576)),
        ("cb_buffer_size", json!(4_194_304)),
        ("sieve_buf_size", json!(1_048_576)),
        ("output_alignment", json!(262_144)),
        ("output_alignment_threshold", json!(524_288)),
        ("cache_mdc_nelmts", json!(10_330)),
        ("cache_rdcc_nelmts", json!(521)),
        ("cache_rdcc_nbytes", json!(1_048_576)),
    ];
    assert_eq!(props.len(), expected.len());
    for (name, value) in expected {
        assert_eq!(props.get(name), Some(&value), "field {name}");
    }
}

#[test]
fn output_rejects_unknown_format_and_stays_unconfigured() {
    let mut output = Output::new().unwrap();
    let mut overrides = Overrides::new();
    overrides.insert("output_format".into(), "json".into());

    let err = output.configure(&overrides).unwrap_err();
    match err {
        ComponentError::Validation(v) => assert_eq!(v.field(), "output_format"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(output.state(), Lifecycle::Unconfigured);
    assert!(output.properties().is_none());
}

#[test]
fn regional_sphere_launches_regional_entry_point() {
    let mut sphere = Sphere::regional().unwrap();
    let resolved = sphere.configure(&Overrides::new()).unwrap();
    assert_eq!(resolved.get_int("nproc_surf"), Some(1));

    let mut module = RecordingModule::default();
    sphere.launch(&mut module).unwrap();

    assert_eq!(module.calls, vec!["regional_sphere_launch"]);
    assert_eq!(sphere.state(), Lifecycle::Launched);
    assert_eq!(sphere.geometry(), GeometryKind::Regional);
}

#[test]
fn launch_state_machine() {
    for kind in GeometryKind::ALL {
        let mut sphere = Sphere::new(kind).unwrap();
        let mut module = RecordingModule::default();

        let err = sphere.launch(&mut module).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::State(StateError {
                state: Lifecycle::Unconfigured,
                ..
            })
        ));

        sphere.configure(&Overrides::new()).unwrap();
        sphere.launch(&mut module).unwrap();

        let err = sphere.launch(&mut module).unwrap_err();
        assert!(matches!(
            err,
            ComponentError::State(StateError {
                state: Lifecycle::Launched,
                ..
            })
        ));
        assert_eq!(module.calls, vec![kind.entry_point()]);
    }
}

#[test]
fn configure_twice_yields_same_mapping() {
    let mut overrides = Overrides::new();
    overrides.insert("nprocx".into(), PropertyValue::Int(2));
    overrides.insert("coor".into(), "yes".into());

    let mut sphere = Sphere::full().unwrap();
    let first = sphere.configure(&overrides).unwrap().clone();
    let second = sphere.configure(&overrides).unwrap().clone();
    assert_eq!(first, second);
    assert_eq!(second.get_bool("coor"), Some(true));
}

#[test]
fn push_after_launch_is_allowed() {
    let mut sphere = Sphere::full().unwrap();
    sphere.configure(&Overrides::new()).unwrap();
    sphere.launch(&mut RecordingModule::default()).unwrap();

    let mut engine = RecordingEngine::default();
    sphere.push_properties(&mut engine).unwrap();
    assert_eq!(engine.pushes[0].0, "full-sphere");
    assert_eq!(engine.pushes[0].1["nproc_surf"], json!(12));
}

#[test]
fn regional_layout_is_single_cap() {
    let mut sphere = Sphere::regional().unwrap();
    let mut overrides = Overrides::new();
    overrides.insert("nprocx".into(), PropertyValue::Int(2));
    overrides.insert("nprocy".into(), PropertyValue::Int(2));
    sphere.configure(&overrides).unwrap();

    let layout = sphere.layout().unwrap();
    assert_eq!(layout.caps(), 1);
    assert_eq!(layout.total(), 4);
    assert!(layout.check_total(4).is_ok());
    assert!(matches!(
        layout.check_total(12),
        Err(ComponentError::Layout { .. })
    ));
}

#[test]
fn oversized_process_grid_is_a_layout_error() {
    let mut sphere = Sphere::full().unwrap();
    let mut overrides = Overrides::new();
    overrides.insert("nprocx".into(), PropertyValue::Int(1 << 32));
    overrides.insert("nprocy".into(), PropertyValue::Int(1 << 32));
    sphere.configure(&overrides).unwrap();

    assert!(matches!(
        sphere.layout(),
        Err(ComponentError::Layout { .. })
    ));
}

proptest! {
    #[test]
    fn rank_location_bijection(
        caps in 1_usize..13,
        nprocx in 1_usize..5,
        nprocy in 1_usize..5,
        nprocz in 1_usize..5,
    ) {
        let layout = ProcessorLayout::new(caps, nprocx, nprocy, nprocz).unwrap();
        for rank in 0..layout.total() {
            let loc = layout.location(rank).unwrap();
            prop_assert_eq!(layout.rank(loc), Some(rank));
        }
        prop_assert_eq!(layout.location(layout.total()), None);

        let mut covered: Vec<usize> = (0..nprocz).flat_map(|z| layout.horizontal_group(z)).collect();
        covered.sort_unstable();
        prop_assert_eq!(covered, (0..layout.total()).collect::<Vec<_>>());
    }
}
