use crate::{Error, shader_words};

#[test]
fn words_follow_native_byte_order() {
    let magic = 0x0723_0203u32;
    let mut binary = magic.to_ne_bytes().to_vec();
    binary.extend(7u32.to_ne_bytes());
    assert_eq!(shader_words(&binary).unwrap(), vec![magic, 7]);
}

#[test]
fn partial_word_is_rejected() {
    let err = shader_words(&[1, 2, 3, 4, 5]).unwrap_err();
    assert!(matches!(err, Error::MisalignedShader { len: 5 }));
    assert_eq!(err.to_string(), "shader binary of 5 bytes is not a whole number of 32-bit words");
}

#[test]
fn empty_binary_has_no_words() {
    assert!(shader_words(&[]).unwrap().is_empty());
}
