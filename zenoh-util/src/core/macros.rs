//
// Copyright (c) 2017, 2020 ADLINK Technology Inc.
//
// This program and the accompanying materials are made available under the
// terms of the Eclipse Public License 2.0 which is available at
// http://www.eclipse.org/legal/epl-2.0, or the Apache License, Version 2.0
// which is available at https://www.apache.org/licenses/LICENSE-2.0.
//
// SPDX-License-Identifier: EPL-2.0 OR Apache-2.0
//
// Contributors:
//   ADLINK zenoh team, <zenoh@adlink-labs.tech>
//

// This macro performs a standard lock on Mutex<T>
// For performance reasons, it first performs a try_lock() and,
// if it fails, it falls back on lock().unwrap()
#[macro_export]
macro_rules! zlock {
    ($var:expr) => {
        match $var.try_lock() {
            Ok(guard) => guard,
            Err(_) => $var.lock().unwrap(),
        }
    };
}

// This macro performs an async lock on Mutex<T>
#[macro_export]
macro_rules! zasynclock {
    ($var:expr) => {
        $var.lock().await
    };
}

// This macro checks the boolean results of an operation and returns in case
// the result is false. Basically, it implements the ? operator for booleans
#[macro_export]
macro_rules! zcheck {
    ($op:expr) => {
        if !$op {
            return false;
        }
    };
}

// This macro allows to define some compile time configurable static constants
#[macro_export]
macro_rules! zconfigurable {
    ($(#[$attr:meta])* static ref $N:ident : $T:ty = $e:expr; $($t:tt)*) => {
        lazy_static!($(#[$attr])* static ref $N : $T = match option_env!(stringify!($N)) {
            Some(value) => {value.parse().unwrap()}
            None => {$e}
        };) ;
        zconfigurable!($($t)*);
    };
    ($(#[$attr:meta])* pub static ref $N:ident : $T:ty = $e:expr; $($t:tt)*) => {
        lazy_static!($(#[$attr])* pub static ref $N : $T = match option_env!(stringify!($N)) {
            Some(value) => {value.parse().unwrap()}
            None => {$e}
        };) ;
        zconfigurable!($($t)*);
    };
    ($(#[$attr:meta])* pub ($($vis:tt)+) static ref $N:ident : $T:ty = $e:expr; $($t:tt)*) => {
        lazy_static!($(#[$attr])* pub ($($vis)+) static ref $N : $T = match option_env!(stringify!($N)) {
            Some(value) => {value.parse().unwrap()}
            None => {$e}
        };) ;
        zconfigurable!($($t)*);
    };
    () => ()
}

// This macro is a shorthand for the creation of a ZError
#[macro_export]
macro_rules! zerror {
    ($kind:expr) => {
        Err($crate::core::ZError::new($kind, file!(), line!(), None))
    };
    ($kind:expr, $source:expr) => {
        Err($crate::core::ZError::new(
            $kind,
            file!(),
            line!(),
            Some(Box::new($source)),
        ))
    };
}

// Same as zerror! but returns the bare ZError instead of an Err
#[macro_export]
macro_rules! zerror2 {
    ($kind:expr) => {
        $crate::core::ZError::new($kind, file!(), line!(), None)
    };
    ($kind:expr, $source:expr) => {
        $crate::core::ZError::new($kind, file!(), line!(), Some(Box::new($source)))
    };
}
