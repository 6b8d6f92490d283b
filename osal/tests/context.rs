use osal::{
    BinarySemaphore, ConditionVariable, Error, LockConfig, Mutex, Osal, Semaphore, Spinlock, Task,
    TaskConfig, Tracer,
};

// Single test: the context is process-wide and other tests would race it.
#[test]
fn test_constructors_require_context() {
    assert!(!Osal::is_initialized());

    assert_eq!(Mutex::new(LockConfig::new()).err(), Some(Error::Unavailable));
    assert!(matches!(Spinlock::new(LockConfig::new()), Err(Error::Unavailable)));
    assert!(matches!(Semaphore::new(0, 1), Err(Error::Unavailable)));
    assert!(matches!(BinarySemaphore::new(false), Err(Error::Unavailable)));
    assert!(matches!(ConditionVariable::new(), Err(Error::Unavailable)));
    assert!(matches!(Tracer::alloc(4), Err(Error::Unavailable)));
    assert!(matches!(
        Task::create(TaskConfig::new(), || ()),
        Err(Error::Unavailable)
    ));

    let osal = Osal::init().unwrap();
    let nested = Osal::init().unwrap();
    assert!(Mutex::new(LockConfig::new()).is_ok());

    drop(osal);
    assert!(Semaphore::new(0, 1).is_ok(), "a second handle keeps the context");

    drop(nested);
    assert!(!Osal::is_initialized());
    assert!(matches!(Semaphore::new(0, 1), Err(Error::Unavailable)));

    assert!(["posix", "generic"].contains(&Osal::backend()));
}
