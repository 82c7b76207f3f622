macro_rules! generate_getters {
  {
    for $T:ty as $self:ident {
      $(
        $(#[$meta:meta])*
        $field:ident -> $R:ty $(= $e:expr)?
      ),* $(,)?
    }
  } => {
    impl $T {
      $(
        #[inline]
        $(#[$meta])*
        pub fn $field(&$self) -> $R {
          generate_getters!(@getter $self $field $($e)?)
        }
      )*
    }
  };

  (@getter $self:ident $field:ident $e:expr) => ($e);
  (@getter $self:ident $field:ident) => ($self.$field.clone());
}

/// Compiles the pattern once, on first use.
macro_rules! pattern {
  ($re:literal) => {{
    static PATTERN: ::std::sync::LazyLock<::regex::Regex> =
      ::std::sync::LazyLock::new(|| ::regex::Regex::new($re).unwrap());
    &*PATTERN
  }};
}

/// Wires up a variant type with the [`Message`][crate::msg::Message] enum.
macro_rules! impl_into_message {
  ($T:ident) => {
    impl From<$T> for crate::msg::Message {
      fn from(msg: $T) -> Self {
        crate::msg::Message::$T(msg)
      }
    }
  };
}

#[cfg(test)]
pub(crate) fn _decode<T: crate::msg::FromLine>(input: &str) -> T {
  <T as crate::msg::FromLine>::from_line(Some(input))
    .unwrap()
    .unwrap()
}

#[cfg(test)]
macro_rules! decode {
  ($T:ty, $input:expr $(,)?) => {{
    $crate::msg::macros::_decode::<$T>($input)
  }};
}
