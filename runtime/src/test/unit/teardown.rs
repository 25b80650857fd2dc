use crate::test::fake::{FakeDevice, FakeDriver};
use crate::{BindingKey, Error, ResourceBindings, RuntimeConfig, Session, Stage};

const SHADER: [u8; 8] = [0x03, 0x02, 0x23, 0x07, 0x00, 0x00, 0x01, 0x00];

fn config() -> RuntimeConfig {
    RuntimeConfig::builder().shader(SHADER.to_vec()).build()
}

#[test]
fn full_session_releases_in_reverse_acquisition_order() {
    let mut data = [0u8; 16];
    let driver = FakeDriver::single();
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    session.run().unwrap();
    session.destroy().unwrap();
    assert_eq!(session.stage(), Stage::Destroyed);
    assert!(session.arena().is_empty());

    let journal = journal.borrow();
    let acquired: Vec<_> = journal.acquired().iter().rev().map(|call| call.handle).collect();
    let released: Vec<_> = journal.releases().iter().map(|call| call.handle).collect();
    assert_eq!(released, acquired);
    assert_eq!(
        journal.releases().iter().map(|call| call.name).collect::<Vec<_>>(),
        [
            "free_command_buffers",
            "destroy_command_pool",
            "free_descriptor_sets",
            "destroy_descriptor_pool",
            "destroy_pipeline",
            "destroy_pipeline_layout",
            "destroy_descriptor_set_layout",
            "destroy_shader_module",
            "destroy_buffer",
            "free_memory",
            "destroy_device",
            "destroy_instance",
        ]
    );
}

#[test]
fn query_pool_released_between_command_buffer_and_pool() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::new(vec![FakeDevice::simple().with_timestamps(64, 1.0)]);
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    session.run().unwrap();
    session.destroy().unwrap();

    let names: Vec<_> = journal.borrow().releases().iter().map(|call| call.name).collect();
    assert_eq!(names[..3], ["free_command_buffers", "destroy_query_pool", "destroy_command_pool"]);
}

#[test]
fn device_waits_idle_before_any_release() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single();
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    session.run().unwrap();
    session.destroy().unwrap();

    let journal = journal.borrow();
    let wait = journal.position("device_wait_idle").unwrap();
    let first_release = journal.position("free_command_buffers").unwrap();
    assert!(wait < first_release);
    assert_eq!(journal.count("device_wait_idle"), 1);
}

#[test]
fn failure_midway_releases_only_what_was_acquired() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single().failing_on("create_compute_pipeline");
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    assert!(matches!(session.run(), Err(Error::DeviceCall { call: "vkCreateComputePipelines", .. })));
    assert_eq!(session.stage(), Stage::LayoutsBuilt);
    session.destroy().unwrap();

    let journal = journal.borrow();
    assert_eq!(
        journal.releases().iter().map(|call| call.name).collect::<Vec<_>>(),
        [
            "destroy_pipeline_layout",
            "destroy_descriptor_set_layout",
            "destroy_shader_module",
            "destroy_buffer",
            "free_memory",
            "destroy_device",
            "destroy_instance",
        ]
    );
}

#[test]
fn failed_buffer_creation_frees_its_memory() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single().failing_on("create_buffer");
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    assert!(session.run().is_err());
    session.destroy().unwrap();

    let names: Vec<_> = journal.borrow().releases().iter().map(|call| call.name).collect();
    assert_eq!(names, ["free_memory", "destroy_device", "destroy_instance"]);
}

#[test]
fn no_device_wait_before_device_exists() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single().failing_on("create_device");
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    assert!(session.run().is_err());
    session.destroy().unwrap();

    let journal = journal.borrow();
    assert_eq!(journal.count("device_wait_idle"), 0);
    assert_eq!(journal.releases().iter().map(|call| call.name).collect::<Vec<_>>(), ["destroy_instance"]);
}

#[test]
fn failed_instance_leaves_nothing_to_release() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single().failing_on("create_instance");
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    assert!(session.create_instance().is_err());
    session.destroy().unwrap();

    assert!(journal.borrow().releases().is_empty());
}

#[test]
fn destroy_is_idempotent() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single();
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    session.run().unwrap();
    session.destroy().unwrap();
    let released = journal.borrow().releases().len();

    session.destroy().unwrap();
    drop(session);
    assert_eq!(journal.borrow().releases().len(), released);
    assert_eq!(journal.borrow().count("device_wait_idle"), 1);
}

#[test]
fn destroyed_session_accepts_no_steps() {
    let mut data = [0u8; 4];
    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(FakeDriver::single(), config(), bindings).unwrap();
    session.create_instance().unwrap();
    session.destroy().unwrap();

    let err = session.create_instance().unwrap_err();
    assert!(matches!(err, Error::InvalidStage { expected: Stage::Uninitialized, actual: Stage::Destroyed }));
}

#[test]
fn failed_idle_wait_keeps_everything() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single().failing_on("device_wait_idle");
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    session.run().unwrap();

    let err = session.destroy().unwrap_err();
    assert!(matches!(err, Error::DeviceCall { call: "vkDeviceWaitIdle", .. }));
    assert_ne!(session.stage(), Stage::Destroyed);
    assert!(!session.arena().is_empty());
    assert!(journal.borrow().releases().is_empty());

    drop(session);
    assert_eq!(journal.borrow().count("device_wait_idle"), 1);
    assert!(journal.borrow().releases().is_empty());
}

#[test]
fn drop_tears_down_live_session() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single();
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    let mut session = Session::new(driver, config(), bindings).unwrap();
    session.run().unwrap();
    drop(session);

    let journal = journal.borrow();
    assert_eq!(journal.count("device_wait_idle"), 1);
    assert_eq!(journal.releases().len(), journal.acquired().len());
}

#[test]
fn drop_of_unstarted_session_makes_no_calls() {
    let mut data = [0u8; 4];
    let driver = FakeDriver::single();
    let journal = driver.journal();

    let mut bindings = ResourceBindings::new();
    bindings.insert(BindingKey::new(0, 0), &mut data);
    drop(Session::new(driver, config(), bindings).unwrap());

    assert!(journal.borrow().calls.is_empty());
}
