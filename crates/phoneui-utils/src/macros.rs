/// Generates a callback-style operation on [`PhoneUtils`](crate::PhoneUtils)
/// that delegates to a domain client and issues the call on the bridge.
///
/// The generated method returns the call id immediately; argument
/// validation errors from the client are returned instead and no call is
/// issued.
macro_rules! impl_call {
    ($(#[$meta:meta])* $name:ident => $client:ident.$method:ident($($arg:ident: $typ:ty),*) -> $ret:ty $(,)?) => {
        $(#[$meta])*
        pub fn $name<U: Send + 'static>(
            &self,
            $($arg: $typ,)*
            callback: Option<$crate::bridge::Callback<$ret, U>>,
            userdata: U,
        ) -> $crate::bridge::Submitted {
            let call = $crate::bridge::IntoCall::<$ret>::into_call(self.$client.$method($($arg),*))?;
            self.bridge.issue(stringify!($name), call, callback, userdata)
        }
    };
}
